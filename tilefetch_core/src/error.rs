//! Error taxonomy for tile addressing and tile fetching.
//!
//! Functions across the workspace return [`anyhow::Result`] and add context as errors
//! travel upwards. The *kind* of a failure is carried by a [`TileError`] at the root of
//! the chain, so callers can tell a broken source apart from a single missing tile:
//!
//! ```
//! use tilefetch_core::TileError;
//!
//! let err = anyhow::Error::from(TileError::Archive("format is 'png'".into()))
//! 	.context("opening 'berlin.mbtiles'");
//! assert!(TileError::find(&err).unwrap().is_fatal());
//! ```

/// Classified failure of a tile operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileError {
	/// Bad data-source URI, URL template, source type or authentication reference.
	#[error("invalid configuration: {0}")]
	Configuration(String),

	/// A service description could not be fetched, parsed, or reported an error.
	#[error("service resolution failed: {0}")]
	ServiceResolution(String),

	/// A tile archive could not be opened or does not hold vector tiles.
	#[error("tile archive error: {0}")]
	Archive(String),

	/// A single tile could not be fetched. Never fatal to a batch.
	#[error("tile fetch failed: {0}")]
	TileFetch(String),

	/// The zoom level is outside the supported range.
	#[error("invalid zoom level {0}, must be <= {max}", max = crate::MAX_ZOOM)]
	InvalidZoom(u32),

	/// The requested tile range exceeds the configured fan-out limit.
	#[error("tile range of {count} tiles exceeds the limit of {limit} tiles")]
	RangeTooLarge { count: u64, limit: u64 },
}

impl TileError {
	/// Search the cause chain of `err` for a [`TileError`].
	pub fn find(err: &anyhow::Error) -> Option<&TileError> {
		err.chain().find_map(|cause| cause.downcast_ref::<TileError>())
	}

	/// Returns `true` for errors that invalidate a source or a whole request, `false` for
	/// per-tile failures.
	pub fn is_fatal(&self) -> bool {
		!matches!(self, TileError::TileFetch(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::{Context, Result, anyhow};

	fn failing() -> Result<()> {
		Err(TileError::ServiceResolution("document reports an error".into()))
			.context("resolving service")
			.context("loading layer")
	}

	#[test]
	fn find_through_context() {
		let err = failing().unwrap_err();
		assert_eq!(
			TileError::find(&err),
			Some(&TileError::ServiceResolution("document reports an error".into()))
		);
		assert_eq!(
			format!("{err:#}"),
			"loading layer: resolving service: service resolution failed: document reports an error"
		);
	}

	#[test]
	fn find_nothing_in_foreign_errors() {
		assert_eq!(TileError::find(&anyhow!("plain")), None);
	}

	#[test]
	fn fatality() {
		assert!(!TileError::TileFetch("timeout".into()).is_fatal());
		assert!(TileError::InvalidZoom(31).is_fatal());
		assert!(TileError::Configuration("x".into()).is_fatal());
		assert!(TileError::RangeTooLarge { count: 10, limit: 1 }.is_fatal());
	}

	#[test]
	fn display() {
		assert_eq!(TileError::InvalidZoom(42).to_string(), "invalid zoom level 42, must be <= 30");
		assert_eq!(
			TileError::RangeTooLarge { count: 9, limit: 4 }.to_string(),
			"tile range of 9 tiles exceeds the limit of 4 tiles"
		);
	}
}
