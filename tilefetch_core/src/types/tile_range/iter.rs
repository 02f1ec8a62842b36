use super::TileRange;
use crate::TileCoord;
use itertools::Itertools;

impl TileRange {
	/// All tiles of the range in row-major order: rows from north to south, columns from
	/// west to east within each row.
	///
	/// The iterator borrows nothing, so the same range can be iterated any number of times
	/// with identical results.
	pub fn iter_coords(&self) -> impl Iterator<Item = TileCoord> + use<> {
		let level = self.level;
		let x_range = self.x_min..self.x_min.saturating_add(self.width);
		let y_range = self.y_min..self.y_min.saturating_add(self.height);
		y_range
			.cartesian_product(x_range)
			.map(move |(y, x)| TileCoord { level, x, y })
	}
}
