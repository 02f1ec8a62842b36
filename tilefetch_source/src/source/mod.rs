//! Tile sources: the backends that turn a tile address into encoded tile bytes.
//!
//! Every backend implements [`TileSource`]. Single tiles come from
//! [`TileSource::get_tile`]; whole ranges from [`TileSource::fetch_range`], which by default
//! fans out over `get_tile` with bounded concurrency, a per-tile timeout and cooperative
//! cancellation.

mod arcgis;
mod mbtiles;
mod xyz;

pub use arcgis::{ArcGisSource, LayerMetadata, MetadataLink};
pub use mbtiles::MbTilesSource;
pub use xyz::{XyzSource, check_template};

use crate::{FetchConfig, SourceKind};
use anyhow::Result;
use async_trait::async_trait;
use futures::{StreamExt, stream};
use std::{fmt::Debug, time::Duration};
use tilefetch_core::{Blob, MercatorExtent, TileCoord, TileError, TileMatrix, TileRange, ZoomRange};
use tokio_util::sync::CancellationToken;

/// Encoded payload of one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTileData {
	pub coord: TileCoord,
	pub data: Blob,
}

/// A tile that could not be fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileFailure {
	pub coord: TileCoord,
	pub error: TileError,
}

impl TileFailure {
	/// Classifies `err`; anything that is not already a [`TileError`] of another kind becomes
	/// [`TileError::TileFetch`] carrying the full context chain.
	pub fn new(coord: TileCoord, err: &anyhow::Error) -> TileFailure {
		let error = match TileError::find(err) {
			Some(TileError::TileFetch(message)) if err.chain().count() == 1 => TileError::TileFetch(message.clone()),
			Some(TileError::TileFetch(_)) | None => TileError::TileFetch(format!("{err:#}")),
			Some(other) => other.clone(),
		};
		TileFailure { coord, error }
	}
}

/// Outcome of a range fetch: every requested tile inside the tile grid is in exactly one of
/// the two lists, unless the fetch was cancelled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchReport {
	/// Successfully fetched tiles, in row-major order.
	pub tiles: Vec<RawTileData>,
	pub failures: Vec<TileFailure>,
	/// `true` if cancellation stopped the fetch before every tile resolved.
	pub cancelled: bool,
}

impl FetchReport {
	#[must_use]
	pub fn with_capacity(capacity: usize) -> FetchReport {
		FetchReport {
			tiles: Vec::with_capacity(capacity),
			failures: Vec::new(),
			cancelled: false,
		}
	}
}

/// Per-fetch knobs handed to [`TileSource::fetch_range`].
#[derive(Clone, Debug)]
pub struct FetchOptions {
	pub timeout: Duration,
	pub max_concurrent_requests: usize,
	pub cancel: CancellationToken,
}

impl FetchOptions {
	#[must_use]
	pub fn from_config(config: &FetchConfig) -> FetchOptions {
		FetchOptions {
			timeout: config.timeout(),
			max_concurrent_requests: config.max_concurrent_requests,
			cancel: CancellationToken::new(),
		}
	}

	#[must_use]
	pub fn with_cancellation(mut self, cancel: CancellationToken) -> FetchOptions {
		self.cancel = cancel;
		self
	}
}

impl Default for FetchOptions {
	fn default() -> Self {
		FetchOptions::from_config(&FetchConfig::default())
	}
}

/// A backend serving encoded tiles in the Web Mercator tile scheme.
///
/// Sources are immutable once built and can be shared between tasks.
#[async_trait]
pub trait TileSource: Debug + Send + Sync {
	fn kind(&self) -> SourceKind;

	/// Human readable identification, usually the template, service URL or archive path.
	fn name(&self) -> &str;

	fn zoom_range(&self) -> ZoomRange;

	/// Area covered by the source, in Web Mercator metres.
	fn extent(&self) -> MercatorExtent;

	/// Fetches one tile.
	///
	/// # Errors
	/// A tile that cannot be delivered is an error carrying [`TileError::TileFetch`].
	async fn get_tile(&self, coord: &TileCoord) -> Result<Blob>;

	/// Fetches every tile of `range`. Failed tiles are listed in
	/// [`FetchReport::failures`] and never appear in [`FetchReport::tiles`].
	async fn fetch_range(&self, range: &TileRange, options: &FetchOptions) -> FetchReport {
		fetch_concurrently(self, range, options).await
	}

	/// The ArcGIS service behind this source, if it is one.
	fn as_arcgis(&self) -> Option<&ArcGisSource> {
		None
	}
}

/// Runs [`TileSource::get_tile`] for every tile of `range` with at most
/// `options.max_concurrent_requests` requests in flight.
///
/// Indices outside the grid of the range's level are skipped. A tile exceeding
/// `options.timeout` fails. Once `options.cancel` fires, requests still in flight are dropped
/// and the tiles gathered so far are returned.
pub async fn fetch_concurrently<S: TileSource + ?Sized>(
	source: &S,
	range: &TileRange,
	options: &FetchOptions,
) -> FetchReport {
	let range = &match TileMatrix::from_web_mercator(range.level()) {
		Ok(matrix) => range.clip(&matrix),
		Err(_) => TileRange::new_empty(range.level()),
	};
	let mut report = FetchReport::with_capacity(usize::try_from(range.count_tiles()).unwrap_or(0));
	let timeout = options.timeout;

	let mut outcomes = stream::iter(range.iter_coords())
		.map(|coord| async move {
			let outcome = match tokio::time::timeout(timeout, source.get_tile(&coord)).await {
				Ok(result) => result,
				Err(_) => Err(TileError::TileFetch(format!("timed out after {timeout:?}")).into()),
			};
			(coord, outcome)
		})
		.buffer_unordered(options.max_concurrent_requests.max(1));

	loop {
		tokio::select! {
			biased;
			() = options.cancel.cancelled() => {
				log::debug!("fetch of {range:?} from '{}' cancelled", source.name());
				report.cancelled = true;
				break;
			}
			next = outcomes.next() => match next {
				Some((coord, Ok(data))) => report.tiles.push(RawTileData { coord, data }),
				Some((coord, Err(err))) => {
					log::debug!("tile {coord:?} failed: {err:#}");
					report.failures.push(TileFailure::new(coord, &err));
				}
				None => break,
			},
		}
	}

	report.tiles.sort_by_key(|tile| tile.coord);
	report.failures.sort_by_key(|failure| failure.coord);
	report
}
