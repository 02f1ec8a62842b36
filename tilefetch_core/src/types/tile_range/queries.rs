use super::TileRange;
use crate::{TileCoord, TileMatrix};
use std::fmt::{self, Debug};

impl TileRange {
	#[must_use]
	pub fn level(&self) -> u8 {
		self.level
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	/// Number of tiles in the range, 0 when empty.
	#[must_use]
	pub fn count_tiles(&self) -> u64 {
		u64::from(self.width) * u64::from(self.height)
	}

	/// `(x_min, y_min, x_max, y_max)`, or `None` for the empty range.
	#[must_use]
	pub fn bounds(&self) -> Option<(u32, u32, u32, u32)> {
		if self.is_empty() {
			return None;
		}
		Some((
			self.x_min,
			self.y_min,
			self.x_min + (self.width - 1),
			self.y_min + (self.height - 1),
		))
	}

	#[must_use]
	pub fn contains(&self, column: u32, row: u32) -> bool {
		match self.bounds() {
			Some((x_min, y_min, x_max, y_max)) => {
				column >= x_min && column <= x_max && row >= y_min && row <= y_max
			}
			None => false,
		}
	}

	#[must_use]
	pub fn contains_coord(&self, coord: &TileCoord) -> bool {
		coord.level == self.level && self.contains(coord.x, coord.y)
	}

	/// Overlap of two ranges. Ranges on different levels never overlap.
	#[must_use]
	pub fn intersect(&self, other: &TileRange) -> TileRange {
		if self.level != other.level {
			return TileRange::new_empty(self.level);
		}
		let (Some(a), Some(b)) = (self.bounds(), other.bounds()) else {
			return TileRange::new_empty(self.level);
		};
		TileRange::from_min_max(self.level, a.0.max(b.0), a.1.max(b.1), a.2.min(b.2), a.3.min(b.3))
	}

	/// Restricts the range to the valid indices of `matrix`.
	///
	/// A range outside the grid, or on another zoom level, clips to the empty range.
	/// Clipping twice gives the same result as clipping once.
	#[must_use]
	pub fn clip(&self, matrix: &TileMatrix) -> TileRange {
		if self.level != matrix.zoom() {
			return TileRange::new_empty(self.level);
		}
		self.intersect(&matrix.full_range())
	}
}

impl Debug for TileRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.bounds() {
			Some((x_min, y_min, x_max, y_max)) => write!(
				f,
				"{}: [{},{},{},{}] ({})",
				self.level,
				x_min,
				y_min,
				x_max,
				y_max,
				self.count_tiles()
			),
			None => write!(f, "{}: empty", self.level),
		}
	}
}
