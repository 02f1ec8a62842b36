use crate::MercatorExtent;
use anyhow::{Result, ensure};
use std::{fmt::Debug, str::FromStr};
use tilefetch_derive::context;

const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;
const MAX_MERCATOR_LNG: f64 = 180.0;
const RADIUS: f64 = 6_378_137.0; // meters

/// A WGS84 bounding box in degrees: `west, south, east, north`.
///
/// MBTiles archives describe their coverage with such a box (`bounds` metadata), and the
/// command line takes one to select an area of interest. Tile math happens in Web Mercator,
/// so the box is usually projected right away:
///
/// ```
/// use tilefetch_core::GeoBBox;
///
/// let bbox: GeoBBox = "-180,-90,180,90".parse().unwrap();
/// let extent = bbox.to_mercator();
/// assert!((extent.x_max - 20_037_508.342_789_2).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a validated box.
	///
	/// # Errors
	/// Fails if a coordinate lies outside of `[-180, 180] x [-90, 90]` or if west > east or
	/// south > north.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
		.checked()
	}

	fn checked(self) -> Result<Self> {
		ensure!(self.x_min >= -180., "x_min ({}) must be >= -180", self.x_min);
		ensure!(self.y_min >= -90., "y_min ({}) must be >= -90", self.y_min);
		ensure!(self.x_max <= 180., "x_max ({}) must be <= 180", self.x_max);
		ensure!(self.y_max <= 90., "y_max ({}) must be <= 90", self.y_max);
		ensure!(
			self.x_min <= self.x_max,
			"x_min ({}) must be <= x_max ({})",
			self.x_min,
			self.x_max
		);
		ensure!(
			self.y_min <= self.y_max,
			"y_min ({}) must be <= y_max ({})",
			self.y_min,
			self.y_max
		);
		Ok(self)
	}

	/// Projects the box into Web Mercator. Latitudes beyond ±85.05° are clamped to the edge
	/// of the Mercator square.
	#[must_use]
	pub fn to_mercator(&self) -> MercatorExtent {
		fn x_from_lon(lon_deg: f64) -> f64 {
			RADIUS * lon_deg.clamp(-MAX_MERCATOR_LNG, MAX_MERCATOR_LNG).to_radians()
		}
		fn y_from_lat(lat_deg: f64) -> f64 {
			let phi = lat_deg.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
			RADIUS * (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln()
		}

		MercatorExtent::new(
			x_from_lon(self.x_min),
			y_from_lat(self.y_min),
			x_from_lon(self.x_max),
			y_from_lat(self.y_max),
		)
	}

	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}
}

/// Parses `west,south,east,north`, the format of the MBTiles `bounds` metadata value.
impl FromStr for GeoBBox {
	type Err = anyhow::Error;

	#[context("parsing bounding box '{s}'")]
	fn from_str(s: &str) -> Result<GeoBBox> {
		let values = s
			.split(',')
			.map(|part| part.trim().parse::<f64>())
			.collect::<Result<Vec<f64>, _>>()?;
		ensure!(values.len() == 4, "expected 4 comma separated numbers, got {}", values.len());
		GeoBBox::new(values[0], values[1], values[2], values[3])
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GeoBBox({}, {}, {}, {})",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}
