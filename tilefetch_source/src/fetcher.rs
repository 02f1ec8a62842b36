//! `TileFetcher` turns a requested tile range into raw tile payloads.
//!
//! Before any request is made the range is clipped to the tile matrix of its zoom level and
//! to the area the source covers. Zoom levels outside the source's zoom range yield an empty
//! result; ranges above [`FetchConfig::max_tiles_per_request`] are rejected.
//!
//! ```rust
//! use std::sync::Arc;
//! use tilefetch_core::TileRange;
//! use tilefetch_source::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//! 	let transport = Arc::new(MockTransport::new());
//! 	transport.insert("https://a/1/0/0", 200, "tile");
//! 	let source = XyzSource::new("https://a/{z}/{x}/{y}", tilefetch_core::ZoomRange::full(), transport)?;
//!
//! 	let fetcher = TileFetcher::default();
//! 	let tiles = fetcher.fetch(&source, &TileRange::new(1, 0, 1, 0, 1)?).await?;
//! 	assert_eq!(tiles.len(), 1);
//! 	Ok(())
//! }
//! ```

use crate::{FetchConfig, FetchOptions, FetchReport, RawTileData, TileSource};
use anyhow::{Result, bail};
use tilefetch_core::{Blob, TileCoord, TileError, TileMatrix, TileRange};
use tilefetch_derive::context;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default)]
pub struct TileFetcher {
	config: FetchConfig,
}

impl TileFetcher {
	pub fn new(config: FetchConfig) -> TileFetcher {
		TileFetcher { config }
	}

	pub fn config(&self) -> &FetchConfig {
		&self.config
	}

	/// The part of `range` that `source` can deliver.
	///
	/// # Errors
	/// Fails with [`TileError::InvalidZoom`] for zoom levels above 30 and with
	/// [`TileError::RangeTooLarge`] if the clipped range exceeds the configured limit.
	pub fn plan(&self, source: &dyn TileSource, range: &TileRange) -> Result<TileRange> {
		let matrix = TileMatrix::from_web_mercator(range.level())?;
		let mut planned = range.clip(&matrix);

		if !source.zoom_range().contains(range.level()) {
			log::debug!(
				"zoom {} is outside the zoom range {} of '{}'",
				range.level(),
				source.zoom_range(),
				source.name()
			);
			return Ok(TileRange::new_empty(range.level()));
		}

		planned = planned.intersect(&matrix.tile_range(&source.extent()));

		let count = planned.count_tiles();
		let limit = self.config.max_tiles_per_request;
		if count > limit {
			bail!(TileError::RangeTooLarge { count, limit });
		}
		Ok(planned)
	}

	/// Fetches all tiles of `range`. Tiles that fail are left out.
	///
	/// # Errors
	/// Fails only if the range cannot be planned; see [`TileFetcher::plan`].
	pub async fn fetch(&self, source: &dyn TileSource, range: &TileRange) -> Result<Vec<RawTileData>> {
		Ok(self.fetch_report(source, range).await?.tiles)
	}

	/// Like [`TileFetcher::fetch`], but reports failed tiles as well.
	#[context("fetching {range:?} from '{}'", source.name())]
	pub async fn fetch_report(&self, source: &dyn TileSource, range: &TileRange) -> Result<FetchReport> {
		self.fetch_cancellable(source, range, CancellationToken::new()).await
	}

	/// Like [`TileFetcher::fetch_report`], stopping early once `cancel` fires. Tiles fetched
	/// before cancellation are kept in the report.
	pub async fn fetch_cancellable(
		&self,
		source: &dyn TileSource,
		range: &TileRange,
		cancel: CancellationToken,
	) -> Result<FetchReport> {
		let planned = self.plan(source, range)?;
		if planned.is_empty() {
			return Ok(FetchReport::default());
		}

		log::debug!("fetching {planned:?} from '{}'", source.name());
		let options = FetchOptions::from_config(&self.config).with_cancellation(cancel);
		let report = source.fetch_range(&planned, &options).await;

		if !report.failures.is_empty() {
			log::debug!(
				"{} of {} tiles from '{}' failed",
				report.failures.len(),
				planned.count_tiles(),
				source.name()
			);
		}
		Ok(report)
	}

	/// Fetches `range` from synchronous code. Must not be called from within an async runtime.
	///
	/// # Errors
	/// Fails if called inside a runtime or if the range cannot be planned.
	pub fn fetch_blocking(&self, source: &dyn TileSource, range: &TileRange) -> Result<Vec<RawTileData>> {
		if tokio::runtime::Handle::try_current().is_ok() {
			bail!("fetch_blocking must not be called from within an async runtime, use fetch instead");
		}
		let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
		runtime.block_on(self.fetch(source, range))
	}

	/// Fetches a single tile. `None` means the tile could not be delivered.
	///
	/// # Errors
	/// Fails only for tile coordinates that cannot be planned.
	pub async fn fetch_tile(&self, source: &dyn TileSource, coord: &TileCoord) -> Result<Option<Blob>> {
		let range = TileRange::from_coord(coord);
		let report = self.fetch_report(source, &range).await?;
		if let Some(failure) = report.failures.first() {
			log::debug!("tile {coord} is unavailable: {}", failure.error);
		}
		Ok(report.tiles.into_iter().next().map(|tile| tile.data))
	}
}
