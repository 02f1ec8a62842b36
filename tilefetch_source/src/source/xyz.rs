use super::TileSource;
use crate::{AuthHeader, DEFAULT_ZOOM_RANGE, HttpRequest, SourceConfig, SourceKind, Transport};
use anyhow::Result;
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tilefetch_core::{Blob, MercatorExtent, TileCoord, TileError, ZoomRange};
use tilefetch_derive::context;

/// Tiles served from a URL template such as `https://tiles.example.com/{z}/{x}/{y}.pbf`.
///
/// `{-y}` stands for the row counted from the south, as used by TMS servers.
pub struct XyzSource {
	template: String,
	zoom_range: ZoomRange,
	transport: Arc<dyn Transport>,
	auth: Option<AuthHeader>,
	referer: Option<String>,
}

/// Checks that `template` addresses tiles: it needs `{x}`, `{z}` and one of `{y}` or `{-y}`.
///
/// # Errors
/// Fails with [`TileError::Configuration`] otherwise.
pub fn check_template(template: &str) -> Result<()> {
	let valid = template.contains("{x}")
		&& template.contains("{z}")
		&& (template.contains("{y}") || template.contains("{-y}"));
	if valid {
		Ok(())
	} else {
		Err(TileError::Configuration(format!("invalid XYZ URL template '{template}'")).into())
	}
}

impl XyzSource {
	/// # Errors
	/// Fails with [`TileError::Configuration`] if the template lacks a placeholder.
	pub fn new(template: &str, zoom_range: ZoomRange, transport: Arc<dyn Transport>) -> Result<XyzSource> {
		check_template(template)?;
		Ok(XyzSource {
			template: template.to_string(),
			zoom_range,
			transport,
			auth: None,
			referer: None,
		})
	}

	/// Builds the source described by `config`. The zoom range is 0 to 14 unless the
	/// configuration overrides a bound.
	#[context("opening XYZ source '{}'", config.url)]
	pub fn open(config: &SourceConfig, transport: Arc<dyn Transport>) -> Result<XyzSource> {
		let zoom_range = DEFAULT_ZOOM_RANGE
			.with_overrides(config.min_zoom, config.max_zoom)
			.map_err(|err| TileError::Configuration(format!("invalid zoom range: {err}")))?;
		Ok(XyzSource::new(&config.url, zoom_range, transport)?
			.with_auth(config.auth.clone())
			.with_referer(config.referer.clone()))
	}

	#[must_use]
	pub fn with_auth(mut self, auth: Option<AuthHeader>) -> XyzSource {
		self.auth = auth;
		self
	}

	#[must_use]
	pub fn with_referer(mut self, referer: Option<String>) -> XyzSource {
		self.referer = referer;
		self
	}

	pub fn template(&self) -> &str {
		&self.template
	}

	/// The template with every placeholder replaced by `coord`.
	///
	/// # Errors
	/// Fails with [`TileError::TileFetch`] if `coord` lies outside the tile grid.
	pub fn tile_url(&self, coord: &TileCoord) -> Result<String> {
		let tms_row = coord
			.tms_row()
			.filter(|_| coord.is_valid())
			.ok_or_else(|| TileError::TileFetch(format!("tile {coord} lies outside the grid of level {}", coord.level)))?;
		Ok(self
			.template
			.replace("{z}", &coord.level.to_string())
			.replace("{x}", &coord.x.to_string())
			.replace("{y}", &coord.y.to_string())
			.replace("{-y}", &tms_row.to_string()))
	}

	pub(crate) fn request(&self, url: &str) -> HttpRequest {
		HttpRequest::new(url)
			.with_referer(self.referer.as_deref())
			.with_auth(self.auth.as_ref())
	}
}

#[async_trait]
impl TileSource for XyzSource {
	fn kind(&self) -> SourceKind {
		SourceKind::Xyz
	}

	fn name(&self) -> &str {
		&self.template
	}

	fn zoom_range(&self) -> ZoomRange {
		self.zoom_range
	}

	fn extent(&self) -> MercatorExtent {
		MercatorExtent::WORLD
	}

	async fn get_tile(&self, coord: &TileCoord) -> Result<Blob> {
		let url = self.tile_url(coord)?;
		log::trace!("fetching tile {coord:?} from '{url}'");

		let response = self
			.transport
			.get(&self.request(&url))
			.await
			.map_err(|err| TileError::TileFetch(format!("requesting '{url}': {err:#}")))?;

		if !response.is_ok() {
			return Err(TileError::TileFetch(format!("HTTP {} for '{url}'", response.status)).into());
		}
		if response.body.is_empty() {
			return Err(TileError::TileFetch(format!("empty response for '{url}'")).into());
		}
		Ok(response.body)
	}
}

impl Debug for XyzSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("XyzSource")
			.field("template", &self.template)
			.field("zoom_range", &self.zoom_range)
			.field("auth", &self.auth)
			.field("referer", &self.referer)
			.finish_non_exhaustive()
	}
}
