use std::fmt::Debug;

/// Half the width of the Web Mercator world, in metres.
pub const WORLD_HALF_WIDTH: f64 = 20_037_508.342_789_2;

/// A rectangle in Web Mercator (EPSG:3857) coordinates, in metres.
///
/// ```
/// use tilefetch_core::MercatorExtent;
///
/// let world = MercatorExtent::WORLD;
/// assert_eq!(world.center(), (0.0, 0.0));
/// assert!(world.contains(1000.0, -1000.0));
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct MercatorExtent {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl MercatorExtent {
	pub const WORLD: MercatorExtent = MercatorExtent {
		x_min: -WORLD_HALF_WIDTH,
		y_min: -WORLD_HALF_WIDTH,
		x_max: WORLD_HALF_WIDTH,
		y_max: WORLD_HALF_WIDTH,
	};

	/// Creates an extent from two arbitrary corners; the coordinates are sorted per axis.
	#[must_use]
	pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> MercatorExtent {
		MercatorExtent {
			x_min: x0.min(x1),
			y_min: y0.min(y1),
			x_max: x0.max(x1),
			y_max: y0.max(y1),
		}
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	#[must_use]
	pub fn center(&self) -> (f64, f64) {
		(
			f64::midpoint(self.x_min, self.x_max),
			f64::midpoint(self.y_min, self.y_max),
		)
	}

	/// Edges count as inside.
	#[must_use]
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
	}

	/// Overlap of two extents, `None` if they are disjoint.
	#[must_use]
	pub fn intersection(&self, other: &MercatorExtent) -> Option<MercatorExtent> {
		let x_min = self.x_min.max(other.x_min);
		let y_min = self.y_min.max(other.y_min);
		let x_max = self.x_max.min(other.x_max);
		let y_max = self.y_max.min(other.y_max);
		(x_min <= x_max && y_min <= y_max).then_some(MercatorExtent {
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}
}

impl Debug for MercatorExtent {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"MercatorExtent([{:.2}, {:.2}, {:.2}, {:.2}])",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_sorts_corners() {
		let extent = MercatorExtent::new(10.0, 5.0, -10.0, -5.0);
		assert_eq!(extent.as_array(), [-10.0, -5.0, 10.0, 5.0]);
		assert_eq!(extent.width(), 20.0);
		assert_eq!(extent.height(), 10.0);
	}

	#[test]
	fn intersection() {
		let a = MercatorExtent::new(0.0, 0.0, 10.0, 10.0);
		let b = MercatorExtent::new(5.0, -5.0, 15.0, 5.0);
		assert_eq!(a.intersection(&b).unwrap().as_array(), [5.0, 0.0, 10.0, 5.0]);

		let c = MercatorExtent::new(20.0, 20.0, 30.0, 30.0);
		assert!(a.intersection(&c).is_none());
	}

	#[test]
	fn world_is_square() {
		assert_eq!(MercatorExtent::WORLD.width(), MercatorExtent::WORLD.height());
		assert!(MercatorExtent::WORLD.contains(WORLD_HALF_WIDTH, -WORLD_HALF_WIDTH));
	}

	#[test]
	fn debug_format() {
		assert_eq!(
			format!("{:?}", MercatorExtent::new(0.0, 1.0, 2.5, 3.125)),
			"MercatorExtent([0.00, 1.00, 2.50, 3.12])"
		);
	}
}
