//! Rectangular ranges of tiles at a single zoom level.
//!
//! A [`TileRange`] stores its minimum column/row and its width/height in tiles; the maximum
//! indices are inclusive. A range with `width == 0` or `height == 0` is empty. Every empty
//! range of a level compares equal to [`TileRange::new_empty`].
//!
//! ```
//! use tilefetch_core::{TileMatrix, TileRange};
//!
//! let range = TileRange::new(2, 3, 1, 0, 1).unwrap();
//! assert_eq!(range.count_tiles(), 6);
//!
//! let matrix = TileMatrix::from_web_mercator(2).unwrap();
//! let clipped = TileRange::new(2, 2, 9, 3, 7).unwrap().clip(&matrix);
//! assert_eq!(clipped.count_tiles(), 2);
//! ```

mod constructors;
mod iter;
mod queries;

/// An inclusive rectangle of tile indices at one zoom level.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct TileRange {
	level: u8,
	x_min: u32,
	y_min: u32,
	width: u32,
	height: u32,
}
