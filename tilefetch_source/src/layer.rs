//! `VectorTileLayer` binds a named data-source URI to an opened tile source.
//!
//! Loading a layer resolves the URI, opens the source through a [`SourceRegistry`] and keeps
//! a [`TileFetcher`] around for raw tile access. A layer that failed to load does not exist:
//! [`VectorTileLayer::load`] returns the error instead.

use crate::{
	AuthStore, DataSourceUri, FetchConfig, LayerMetadata, SourceConfig, SourceRegistry, TileFetcher, TileSource, Transport,
};
use anyhow::Result;
use serde_json::Value;
use std::{fmt::Write, path::Path, sync::Arc};
use tilefetch_core::{Blob, TileCoord, ZoomRange};
use tilefetch_derive::context;

#[derive(Clone, Debug)]
pub struct VectorTileLayer {
	name: String,
	uri: DataSourceUri,
	source: Arc<dyn TileSource>,
	fetcher: TileFetcher,
}

impl VectorTileLayer {
	#[context("loading layer '{name}'")]
	pub async fn load(
		name: &str,
		uri: &DataSourceUri,
		auth: &AuthStore,
		registry: &SourceRegistry,
		transport: Arc<dyn Transport>,
		config: &FetchConfig,
	) -> Result<VectorTileLayer> {
		let source_config = SourceConfig::from_uri(uri, auth)?.with_timeout(config.timeout());
		let source = registry.open(&source_config, transport).await?;
		log::debug!(
			"layer '{name}' uses {} source '{}' at zoom {}",
			source.kind(),
			source.name(),
			source.zoom_range()
		);
		Ok(VectorTileLayer {
			name: name.to_string(),
			uri: uri.clone(),
			source,
			fetcher: TileFetcher::new(config.clone()),
		})
	}

	/// Loads a layer whose URI was stored relative to `base_dir`.
	pub async fn load_relative(
		name: &str,
		encoded: &DataSourceUri,
		base_dir: &Path,
		auth: &AuthStore,
		registry: &SourceRegistry,
		transport: Arc<dyn Transport>,
		config: &FetchConfig,
	) -> Result<VectorTileLayer> {
		let uri = encoded.decode_relative(base_dir);
		VectorTileLayer::load(name, &uri, auth, registry, transport, config).await
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn uri(&self) -> &DataSourceUri {
		&self.uri
	}

	/// The URI with local paths made relative to `base_dir`, for storing in a project file.
	pub fn encoded_uri(&self, base_dir: &Path) -> DataSourceUri {
		self.uri.encode_relative(base_dir)
	}

	pub fn source(&self) -> &Arc<dyn TileSource> {
		&self.source
	}

	pub fn fetcher(&self) -> &TileFetcher {
		&self.fetcher
	}

	/// The `type` parameter of the URI, e.g. `xyz` or `mbtiles`.
	pub fn source_type(&self) -> &str {
		self.uri.source_type().unwrap_or_default()
	}

	/// The `url` parameter of the URI: a URL template, service URL or archive path.
	pub fn source_path(&self) -> &str {
		self.uri.url().unwrap_or_default()
	}

	pub fn zoom_range(&self) -> ZoomRange {
		self.source.zoom_range()
	}

	/// The encoded tile at `coord`, or `None` if the source cannot deliver it.
	///
	/// # Errors
	/// Fails only for invalid zoom levels.
	pub async fn get_raw_tile(&self, coord: &TileCoord) -> Result<Option<Blob>> {
		self.fetcher.fetch_tile(self.source.as_ref(), coord).await
	}

	/// The default style of the source, if it has one. Only ArcGIS services publish styles.
	pub async fn load_default_style(&self) -> Result<Option<Value>> {
		match self.source.as_arcgis() {
			Some(arcgis) if arcgis.default_style_url().is_some() => Ok(Some(arcgis.load_default_style().await?)),
			_ => Ok(None),
		}
	}

	/// Metadata derived from the source, if it provides any.
	pub fn default_metadata(&self) -> Option<LayerMetadata> {
		self.source.as_arcgis().map(|arcgis| arcgis.layer_metadata())
	}

	/// A plain text overview of the layer.
	pub fn summary(&self) -> String {
		let mut text = String::new();
		let zoom = self.zoom_range();
		let _ = writeln!(text, "name:        {}", self.name);
		let _ = writeln!(text, "uri:         {}", self.uri);
		let _ = writeln!(text, "source type: {}", self.source.kind());
		let _ = writeln!(text, "source path: {}", self.source_path());
		let _ = writeln!(text, "zoom levels: {} to {}", zoom.min, zoom.max);
		text
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{MockTransport, SourceKind};
	use pretty_assertions::assert_eq;
	use serde_json::json;
	use tilefetch_core::TileError;

	const SERVICE: &str = "https://host/VectorTileServer";

	async fn load(uri: &DataSourceUri, transport: &Arc<MockTransport>) -> Result<VectorTileLayer> {
		VectorTileLayer::load(
			"roads",
			uri,
			&AuthStore::new(),
			&SourceRegistry::default(),
			transport.clone(),
			&FetchConfig::default(),
		)
		.await
	}

	#[tokio::test]
	async fn xyz_layer() {
		let transport = Arc::new(MockTransport::new());
		transport.insert("https://a/2/1/3.pbf", 200, "tile");
		let uri = DataSourceUri::xyz("https://a/{z}/{x}/{y}.pbf").with_param("zmax", "6");
		let layer = load(&uri, &transport).await.unwrap();

		assert_eq!(layer.name(), "roads");
		assert_eq!(layer.source_type(), "xyz");
		assert_eq!(layer.source_path(), "https://a/{z}/{x}/{y}.pbf");
		assert_eq!(layer.zoom_range(), ZoomRange::new(0, 6).unwrap());

		let tile = layer.get_raw_tile(&TileCoord::new(2, 1, 3).unwrap()).await.unwrap();
		assert_eq!(tile.unwrap().as_slice(), b"tile");
		let outside = layer.get_raw_tile(&TileCoord::new(7, 1, 3).unwrap()).await.unwrap();
		assert_eq!(outside, None);

		assert_eq!(layer.load_default_style().await.unwrap(), None);
		assert_eq!(layer.default_metadata(), None);
		assert_eq!(
			layer.summary(),
			"name:        roads\n\
			uri:         type=xyz&url=https://a/%7Bz%7D/%7Bx%7D/%7By%7D.pbf&zmax=6\n\
			source type: xyz\n\
			source path: https://a/{z}/{x}/{y}.pbf\n\
			zoom levels: 0 to 6\n"
		);
	}

	#[tokio::test]
	async fn arcgis_layer() {
		let transport = Arc::new(MockTransport::new());
		let document = json!({
			"name": "Base",
			"tiles": ["tile/{z}/{y}/{x}.pbf"],
			"maxzoom": 12,
			"defaultStyles": "resources/styles/root.json",
		});
		transport.insert(SERVICE, 200, document.to_string());
		transport.insert(&format!("{SERVICE}/resources/styles/root.json"), 200, r#"{"version":8}"#);

		let layer = load(&DataSourceUri::arcgis(SERVICE), &transport).await.unwrap();
		assert_eq!(layer.source().kind(), SourceKind::ArcGis);
		assert_eq!(layer.load_default_style().await.unwrap(), Some(json!({"version": 8})));
		assert_eq!(layer.default_metadata().unwrap().title, "Base");
	}

	#[tokio::test]
	async fn service_resolution_uses_the_fetch_timeout() {
		let transport = Arc::new(MockTransport::new());
		transport.insert_delayed(SERVICE, std::time::Duration::from_secs(3600), "{}");
		let config = FetchConfig {
			timeout_seconds: 0.05,
			..FetchConfig::default()
		};

		let err = VectorTileLayer::load(
			"base",
			&DataSourceUri::arcgis(SERVICE),
			&AuthStore::new(),
			&SourceRegistry::default(),
			transport.clone(),
			&config,
		)
		.await
		.unwrap_err();
		assert!(matches!(TileError::find(&err), Some(TileError::ServiceResolution(_))));
	}

	#[tokio::test]
	async fn failed_layers_report_the_cause() {
		let transport = Arc::new(MockTransport::new());
		transport.insert(SERVICE, 200, r#"{"error": "Invalid token"}"#);
		let err = load(&DataSourceUri::arcgis(SERVICE), &transport).await.unwrap_err();
		assert!(matches!(TileError::find(&err), Some(TileError::ServiceResolution(_))));
		assert!(format!("{err:#}").starts_with("loading layer 'roads': "));

		let err = load(&DataSourceUri::xyz("https://a/tiles.pbf"), &transport).await.unwrap_err();
		assert!(matches!(TileError::find(&err), Some(TileError::Configuration(_))));
	}

	#[tokio::test]
	async fn relative_archive_paths() {
		let dir = assert_fs::TempDir::new().unwrap();
		let uri = DataSourceUri::mbtiles(&dir.join("data/a.mbtiles").to_string_lossy());
		let encoded = uri.encode_relative(&dir);
		assert_eq!(encoded.url(), Some("./data/a.mbtiles"));

		let transport = Arc::new(MockTransport::new());
		let err = VectorTileLayer::load_relative(
			"a",
			&encoded,
			&dir,
			&AuthStore::new(),
			&SourceRegistry::default(),
			transport,
			&FetchConfig::default(),
		)
		.await
		.unwrap_err();
		assert!(matches!(TileError::find(&err), Some(TileError::Archive(_))));
	}
}
