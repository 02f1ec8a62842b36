mod blob;
mod geo_bbox;
mod mercator_extent;
mod tile_coord;
mod tile_matrix;
mod tile_range;
mod zoom_range;

pub use blob::*;
pub use geo_bbox::*;
pub use mercator_extent::*;
pub use tile_coord::*;
pub use tile_matrix::*;
pub use tile_range::*;
pub use zoom_range::*;
