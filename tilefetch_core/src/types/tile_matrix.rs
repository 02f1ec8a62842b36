//! The Web Mercator tile grid of a single zoom level.
//!
//! A [`TileMatrix`] maps projected coordinates onto tile indices and back. All backends are
//! addressed through it, whatever projection they use natively.
//!
//! ```
//! use tilefetch_core::TileMatrix;
//!
//! let matrix = TileMatrix::from_web_mercator(3).unwrap();
//! assert_eq!(matrix.tile_count(), 8);
//! assert_eq!(matrix.geo_to_tile(0.0, 0.0), (4, 4));
//! assert_eq!(matrix.full_range().count_tiles(), 64);
//! ```

use crate::{MAX_ZOOM, MercatorExtent, TileError, TileRange, WORLD_HALF_WIDTH};
use anyhow::Result;
use std::fmt::Debug;

/// Size of a tile edge in pixels.
pub const TILE_SIZE: u32 = 256;

/// Size of a rendering pixel in metres, as defined by OGC WMTS.
const OGC_PIXEL_SIZE: f64 = 0.000_28;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TileMatrix {
	zoom: u8,
}

impl TileMatrix {
	/// Builds the Web Mercator grid of `zoom`.
	///
	/// # Errors
	/// Fails with [`TileError::InvalidZoom`] if `zoom > MAX_ZOOM`.
	pub fn from_web_mercator(zoom: u8) -> Result<TileMatrix> {
		if zoom > MAX_ZOOM {
			return Err(TileError::InvalidZoom(u32::from(zoom)).into());
		}
		Ok(TileMatrix { zoom })
	}

	#[must_use]
	pub fn zoom(&self) -> u8 {
		self.zoom
	}

	/// Number of tiles along each axis, `2^zoom`.
	#[must_use]
	pub fn tile_count(&self) -> u32 {
		1u32 << self.zoom
	}

	#[must_use]
	pub fn tile_size(&self) -> u32 {
		TILE_SIZE
	}

	/// Edge length of one tile in metres.
	#[must_use]
	pub fn tile_width(&self) -> f64 {
		2.0 * WORLD_HALF_WIDTH / f64::from(self.tile_count())
	}

	/// Metres per pixel.
	#[must_use]
	pub fn resolution(&self) -> f64 {
		self.tile_width() / f64::from(TILE_SIZE)
	}

	/// Top left corner of the grid.
	#[must_use]
	pub fn origin(&self) -> (f64, f64) {
		(-WORLD_HALF_WIDTH, WORLD_HALF_WIDTH)
	}

	#[must_use]
	pub fn extent(&self) -> MercatorExtent {
		MercatorExtent::WORLD
	}

	#[must_use]
	pub fn scale_denominator(&self) -> f64 {
		self.resolution() / OGC_PIXEL_SIZE
	}

	/// Column and row of the tile containing the projected point `(x, y)`.
	///
	/// Points outside the grid snap to the nearest border tile, so the result is always a
	/// valid index pair. Row 0 is the northernmost row.
	#[must_use]
	pub fn geo_to_tile(&self, x: f64, y: f64) -> (u32, u32) {
		let (origin_x, origin_y) = self.origin();
		let width = self.tile_width();
		(
			self.clamp_index((x - origin_x) / width),
			self.clamp_index((origin_y - y) / width),
		)
	}

	fn clamp_index(&self, value: f64) -> u32 {
		let max = f64::from(self.tile_count() - 1);
		if value.is_nan() {
			return 0;
		}
		value.floor().clamp(0.0, max) as u32
	}

	/// Projected rectangle covered by a tile.
	#[must_use]
	pub fn tile_extent(&self, column: u32, row: u32) -> MercatorExtent {
		let (origin_x, origin_y) = self.origin();
		let width = self.tile_width();
		let x_min = origin_x + f64::from(column) * width;
		let y_max = origin_y - f64::from(row) * width;
		MercatorExtent {
			x_min,
			y_min: y_max - width,
			x_max: x_min + width,
			y_max,
		}
	}

	/// Tiles covering a projected extent, clamped to the grid.
	///
	/// Edges are pulled inwards by a tiny fraction of a tile, so an extent ending exactly on
	/// a tile border does not pull in the neighbouring tile.
	#[must_use]
	pub fn tile_range(&self, extent: &MercatorExtent) -> TileRange {
		let Some(extent) = extent.intersection(&MercatorExtent::WORLD) else {
			return TileRange::new_empty(self.zoom);
		};
		let tolerance = self.tile_width() * 1e-6;
		let (col_min, row_min) = self.geo_to_tile(extent.x_min + tolerance, extent.y_max - tolerance);
		let (col_max, row_max) = self.geo_to_tile(extent.x_max - tolerance, extent.y_min + tolerance);

		TileRange::from_min_max(
			self.zoom,
			col_min,
			row_min,
			col_max.max(col_min),
			row_max.max(row_min),
		)
	}

	/// Every tile of this zoom level.
	#[must_use]
	pub fn full_range(&self) -> TileRange {
		let max = self.tile_count() - 1;
		TileRange::from_min_max(self.zoom, 0, 0, max, max)
	}
}

impl Debug for TileMatrix {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "TileMatrix(zoom {}, {}x{} tiles)", self.zoom, self.tile_count(), self.tile_count())
	}
}
