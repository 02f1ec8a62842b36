//! Tile addressing for Web Mercator tile pyramids.
//!
//! This crate holds the plain value types shared by the tilefetch crates:
//!
//! - [`TileCoord`]: the address of one tile,
//! - [`TileMatrix`]: the tile grid of one zoom level, mapping projected coordinates to tiles,
//! - [`TileRange`]: a rectangle of tiles that can be clipped, intersected and iterated,
//! - [`MercatorExtent`] and [`GeoBBox`]: projected and geographic rectangles,
//! - [`Blob`]: an opaque tile payload,
//! - [`TileError`]: the error taxonomy used by every fetch operation.
//!
//! Nothing here performs I/O.

mod error;
pub use error::*;

pub mod types;
pub use types::*;

/// Deepest supported zoom level.
pub const MAX_ZOOM: u8 = 30;
