use super::TileRange;
use crate::{GeoBBox, MAX_ZOOM, TileCoord, TileError, TileMatrix};
use anyhow::{Result, ensure};
use tilefetch_derive::context;

impl TileRange {
	/// The empty range of `level`.
	#[must_use]
	pub fn new_empty(level: u8) -> TileRange {
		TileRange {
			level,
			x_min: 0,
			y_min: 0,
			width: 0,
			height: 0,
		}
	}

	/// Builds a range from two columns and two rows given in any order.
	///
	/// Indices are not checked against the grid of `level`; see [`TileRange::clip`].
	///
	/// # Errors
	/// Fails with [`TileError::InvalidZoom`] if `level > MAX_ZOOM`.
	pub fn new(level: u8, col_a: u32, col_b: u32, row_a: u32, row_b: u32) -> Result<TileRange> {
		if level > MAX_ZOOM {
			return Err(TileError::InvalidZoom(u32::from(level)).into());
		}
		Ok(TileRange::from_min_max(
			level,
			col_a.min(col_b),
			row_a.min(row_b),
			col_a.max(col_b),
			row_a.max(row_b),
		))
	}

	/// Builds a range from its minimum and inclusive maximum indices.
	///
	/// `x_max < x_min` or `y_max < y_min` yields the empty range.
	#[must_use]
	pub fn from_min_max(level: u8, x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> TileRange {
		if x_max < x_min || y_max < y_min {
			return TileRange::new_empty(level);
		}
		TileRange {
			level,
			x_min,
			y_min,
			width: (x_max - x_min).saturating_add(1),
			height: (y_max - y_min).saturating_add(1),
		}
	}

	/// The range spanned by two corner tiles.
	///
	/// # Errors
	/// Fails if the corners lie on different zoom levels.
	#[context("building tile range from {a:?} and {b:?}")]
	pub fn from_corners(a: &TileCoord, b: &TileCoord) -> Result<TileRange> {
		ensure!(
			a.level == b.level,
			"corner zoom levels differ ({} != {})",
			a.level,
			b.level
		);
		TileRange::new(a.level, a.x, b.x, a.y, b.y)
	}

	/// A range holding exactly one tile.
	#[must_use]
	pub fn from_coord(coord: &TileCoord) -> TileRange {
		TileRange::from_min_max(coord.level, coord.x, coord.y, coord.x, coord.y)
	}

	/// The tiles covering a WGS84 bounding box.
	///
	/// # Errors
	/// Fails with [`TileError::InvalidZoom`] if `level > MAX_ZOOM`.
	pub fn from_geo(level: u8, bbox: &GeoBBox) -> Result<TileRange> {
		let matrix = TileMatrix::from_web_mercator(level)?;
		Ok(matrix.tile_range(&bbox.to_mercator()))
	}
}
