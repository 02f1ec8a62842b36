use crate::{MAX_ZOOM, TileError};
use anyhow::{Result, ensure};
use std::fmt::{self, Debug, Display};

/// An inclusive range of zoom levels a source can serve.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoomRange {
	pub min: u8,
	pub max: u8,
}

impl ZoomRange {
	/// # Errors
	/// Fails with [`TileError::InvalidZoom`] above [`MAX_ZOOM`] and if `min > max`.
	pub fn new(min: u8, max: u8) -> Result<ZoomRange> {
		if max > MAX_ZOOM {
			return Err(TileError::InvalidZoom(u32::from(max)).into());
		}
		ensure!(min <= max, "min zoom ({min}) must be <= max zoom ({max})");
		Ok(ZoomRange { min, max })
	}

	/// Every zoom level from 0 to [`MAX_ZOOM`].
	#[must_use]
	pub fn full() -> ZoomRange {
		ZoomRange { min: 0, max: MAX_ZOOM }
	}

	#[must_use]
	pub fn contains(&self, level: u8) -> bool {
		level >= self.min && level <= self.max
	}

	#[must_use]
	pub fn clamp(&self, level: u8) -> u8 {
		level.clamp(self.min, self.max)
	}

	/// Replaces either bound where an override is given. The result is re-validated.
	///
	/// # Errors
	/// Fails when the overrides produce an invalid range.
	pub fn with_overrides(&self, min: Option<u8>, max: Option<u8>) -> Result<ZoomRange> {
		ZoomRange::new(min.unwrap_or(self.min), max.unwrap_or(self.max))
	}

	/// Applies bounds declared by a data source. Never fails: a single declared bound drags
	/// the other one along, bounds are capped at [`MAX_ZOOM`] and swapped if reversed.
	#[must_use]
	pub fn with_declared(&self, min: Option<u8>, max: Option<u8>) -> ZoomRange {
		let (min, max) = match (min, max) {
			(Some(min), Some(max)) => (min, max),
			(Some(min), None) => (min, self.max.max(min)),
			(None, Some(max)) => (self.min.min(max), max),
			(None, None) => (self.min, self.max),
		};
		let (min, max) = (min.min(MAX_ZOOM), max.min(MAX_ZOOM));
		ZoomRange {
			min: min.min(max),
			max: min.max(max),
		}
	}
}

impl Debug for ZoomRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ZoomRange({}..={})", self.min, self.max)
	}
}

impl Display for ZoomRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.min, self.max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn validation() {
		assert!(ZoomRange::new(0, 14).is_ok());
		assert!(ZoomRange::new(5, 5).is_ok());
		assert!(ZoomRange::new(6, 5).is_err());
		let err = ZoomRange::new(0, 31).unwrap_err();
		assert_eq!(TileError::find(&err), Some(&TileError::InvalidZoom(31)));
	}

	#[test]
	fn contains_and_clamp() {
		let range = ZoomRange::new(2, 10).unwrap();
		assert!(!range.contains(1));
		assert!(range.contains(2));
		assert!(range.contains(10));
		assert!(!range.contains(11));
		assert_eq!(range.clamp(0), 2);
		assert_eq!(range.clamp(20), 10);
		assert_eq!(range.clamp(7), 7);
	}

	#[test]
	fn overrides() {
		let range = ZoomRange::new(0, 14).unwrap();
		assert_eq!(range.with_overrides(Some(3), None).unwrap(), ZoomRange::new(3, 14).unwrap());
		assert_eq!(range.with_overrides(None, Some(8)).unwrap(), ZoomRange::new(0, 8).unwrap());
		assert!(range.with_overrides(Some(15), None).is_err());
	}

	#[rstest]
	#[case(Some(15), None, (15, 15))]
	#[case(Some(3), None, (3, 14))]
	#[case(None, Some(8), (0, 8))]
	#[case(Some(9), Some(4), (4, 9))]
	#[case(Some(2), Some(40), (2, 30))]
	#[case(None, None, (0, 14))]
	fn declared_bounds(#[case] min: Option<u8>, #[case] max: Option<u8>, #[case] expected: (u8, u8)) {
		let range = ZoomRange::new(0, 14).unwrap().with_declared(min, max);
		assert_eq!((range.min, range.max), expected);
	}

	#[test]
	fn formatting() {
		let range = ZoomRange::new(0, 15).unwrap();
		assert_eq!(format!("{range:?}"), "ZoomRange(0..=15)");
		assert_eq!(range.to_string(), "0-15");
		assert_eq!(ZoomRange::full().max, 30);
	}
}
