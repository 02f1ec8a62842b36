//! Tile addresses in a Web Mercator tile pyramid.
//!
//! A [`TileCoord`] names one tile by zoom `level`, column `x` and row `y` in the XYZ scheme
//! (row 0 at the top). It is the request key and the result key of every fetch.
//!
//! ```
//! use tilefetch_core::TileCoord;
//!
//! let coord: TileCoord = "2/3/1".parse().unwrap();
//! assert_eq!(coord, TileCoord::new(2, 3, 1).unwrap());
//! assert_eq!(coord.tms_row(), Some(2));
//! assert_eq!(coord.to_string(), "2/3/1");
//! ```

use crate::{MAX_ZOOM, TileError};
use anyhow::{Context, Result, ensure};
use std::{
	cmp::Ordering,
	fmt::{self, Debug, Display},
	str::FromStr,
};
use tilefetch_derive::context;

/// A tile address: zoom level, column and row.
#[derive(Eq, PartialEq, Clone, Copy, Hash)]
pub struct TileCoord {
	/// Zoom level, `0..=MAX_ZOOM`.
	pub level: u8,
	/// Column index, `0..2^level`.
	pub x: u32,
	/// Row index (XYZ scheme, row 0 is north), `0..2^level`.
	pub y: u32,
}

impl TileCoord {
	/// Create a validated tile address.
	///
	/// # Errors
	/// Returns [`TileError::InvalidZoom`] if `level > MAX_ZOOM`, and a plain error if `x` or
	/// `y` lie outside the grid of that level.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		if level > MAX_ZOOM {
			return Err(TileError::InvalidZoom(u32::from(level)).into());
		}
		let count = 1u32 << level;
		ensure!(x < count, "x ({x}) out of bounds for level {level}");
		ensure!(y < count, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Largest valid column/row index at this level, `2^level - 1`.
	#[must_use]
	pub fn max_index(&self) -> u32 {
		1u32.checked_shl(u32::from(self.level)).map_or(u32::MAX, |count| count - 1)
	}

	/// `true` if the address lies inside the grid of its level.
	#[must_use]
	pub fn is_valid(&self) -> bool {
		self.level <= MAX_ZOOM && self.x <= self.max_index() && self.y <= self.max_index()
	}

	/// Row index in the TMS scheme (row 0 at the bottom), as used by MBTiles archives.
	///
	/// `None` if the row lies outside the grid of its level, which only happens for
	/// addresses built from the public fields without [`TileCoord::new`].
	#[must_use]
	pub fn tms_row(&self) -> Option<u32> {
		if self.level > MAX_ZOOM {
			return None;
		}
		self.max_index().checked_sub(self.y)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

/// `z/x/y`, the path form used by tile servers.
impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

impl FromStr for TileCoord {
	type Err = anyhow::Error;

	#[context("parsing tile address '{s}', expected 'z/x/y'")]
	fn from_str(s: &str) -> Result<TileCoord> {
		let parts: Vec<&str> = s.trim().split('/').collect();
		ensure!(parts.len() == 3, "expected three components, got {}", parts.len());
		let level: u8 = parts[0].parse().context("invalid zoom level")?;
		let x: u32 = parts[1].parse().context("invalid column")?;
		let y: u32 = parts[2].parse().context("invalid row")?;
		TileCoord::new(level, x, y)
	}
}

/// Ordered by zoom level, then row, then column (row-major within a level).
impl PartialOrd for TileCoord {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TileCoord {
	fn cmp(&self, other: &Self) -> Ordering {
		self
			.level
			.cmp(&other.level)
			.then(self.y.cmp(&other.y))
			.then(self.x.cmp(&other.x))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashSet;

	#[test]
	fn new_validates() {
		assert!(TileCoord::new(0, 0, 0).is_ok());
		assert!(TileCoord::new(2, 3, 3).is_ok());
		assert!(TileCoord::new(2, 4, 0).is_err());
		assert!(TileCoord::new(2, 0, 4).is_err());

		let err = TileCoord::new(31, 0, 0).unwrap_err();
		assert_eq!(TileError::find(&err), Some(&TileError::InvalidZoom(31)));
	}

	#[rstest]
	#[case(2, 1, 2)]
	#[case(2, 0, 3)]
	#[case(0, 0, 0)]
	#[case(3, 7, 0)]
	fn tms_row(#[case] level: u8, #[case] y: u32, #[case] expected: u32) {
		let coord = TileCoord::new(level, 0, y).unwrap();
		assert_eq!(coord.tms_row(), Some(expected));
	}

	#[rstest]
	#[case(1, 5)]
	#[case(0, 1)]
	#[case(31, 0)]
	fn tms_row_outside_grid(#[case] level: u8, #[case] y: u32) {
		let coord = TileCoord { level, x: 0, y };
		assert_eq!(coord.tms_row(), None);
		assert!(!coord.is_valid());
	}

	#[test]
	fn equality_and_hash_by_value() {
		let set: HashSet<TileCoord> = [
			TileCoord::new(3, 1, 2).unwrap(),
			TileCoord::new(3, 1, 2).unwrap(),
			TileCoord::new(3, 2, 1).unwrap(),
		]
		.into_iter()
		.collect();
		assert_eq!(set.len(), 2);
	}

	#[test]
	fn ordering_is_row_major() {
		let mut coords = vec![
			TileCoord::new(2, 0, 1).unwrap(),
			TileCoord::new(2, 1, 0).unwrap(),
			TileCoord::new(1, 1, 1).unwrap(),
			TileCoord::new(2, 0, 0).unwrap(),
		];
		coords.sort();
		assert_eq!(
			coords.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
			vec!["1/1/1", "2/0/0", "2/1/0", "2/0/1"]
		);
	}

	#[rstest]
	#[case("14/8803/5376", Some((14, 8803, 5376)))]
	#[case(" 0/0/0 ", Some((0, 0, 0)))]
	#[case("1/2/0", None)]
	#[case("a/b/c", None)]
	#[case("1/0", None)]
	fn parse(#[case] input: &str, #[case] expected: Option<(u8, u32, u32)>) {
		let parsed = input.parse::<TileCoord>().ok().map(|c| (c.level, c.x, c.y));
		assert_eq!(parsed, expected);
	}

	#[test]
	fn debug_format() {
		assert_eq!(format!("{:?}", TileCoord::new(4, 7, 8).unwrap()), "TileCoord(4, [7, 8])");
	}
}
