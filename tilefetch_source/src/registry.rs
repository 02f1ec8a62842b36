//! `SourceRegistry` maps every [`SourceKind`] to an async constructor.
//!
//! The default registry knows all built-in backends. Custom constructors can replace them,
//! e.g. to wrap a source or to open archives from another location:
//!
//! ```rust
//! use std::sync::Arc;
//! use tilefetch_source::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//! 	let transport: Arc<dyn Transport> = Arc::new(MockTransport::new());
//! 	let registry = SourceRegistry::default();
//!
//! 	let uri: DataSourceUri = "type=xyz&url=https://tiles.example.com/%7Bz%7D/%7Bx%7D/%7By%7D.pbf"
//! 		.parse()
//! 		.unwrap();
//! 	let source = registry.open_uri(&uri, &AuthStore::new(), transport).await.unwrap();
//! 	assert_eq!(source.kind(), SourceKind::Xyz);
//! }
//! ```

use crate::{ArcGisSource, AuthStore, DataSourceUri, MbTilesSource, SourceConfig, SourceKind, TileSource, Transport, XyzSource};
use anyhow::{Result, anyhow};
use std::{collections::HashMap, future::Future, path::PathBuf, pin::Pin, sync::Arc};
use tilefetch_core::TileError;
use tilefetch_derive::context;

type OpenFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn TileSource>>> + Send>>;
type OpenSource = Box<dyn Fn(SourceConfig, Arc<dyn Transport>) -> OpenFuture + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SourceRegistry {
	openers: HashMap<SourceKind, Arc<OpenSource>>,
}

impl SourceRegistry {
	/// A registry without any constructor.
	pub fn new_empty() -> SourceRegistry {
		SourceRegistry {
			openers: HashMap::new(),
		}
	}

	/// Registers `open` for `kind`, replacing a previous constructor.
	pub fn register<F, Fut>(&mut self, kind: SourceKind, open: F)
	where
		F: Fn(SourceConfig, Arc<dyn Transport>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Arc<dyn TileSource>>> + Send + 'static,
	{
		self
			.openers
			.insert(kind, Arc::new(Box::new(move |config, transport| Box::pin(open(config, transport)))));
	}

	pub fn supports(&self, kind: SourceKind) -> bool {
		self.openers.contains_key(&kind)
	}

	/// Builds the source described by `config`.
	///
	/// # Errors
	/// Fails with [`TileError::Configuration`] if no constructor is registered for the kind,
	/// otherwise with whatever the constructor reports.
	#[context("opening {} source '{}'", config.kind, config.url)]
	pub async fn open(&self, config: &SourceConfig, transport: Arc<dyn Transport>) -> Result<Arc<dyn TileSource>> {
		let open = self
			.openers
			.get(&config.kind)
			.ok_or_else(|| anyhow!(TileError::Configuration(format!("unsupported source type '{}'", config.kind))))?;
		open(config.clone(), transport).await
	}

	/// Resolves `uri` with `auth` and builds the source.
	///
	/// # Errors
	/// See [`SourceConfig::from_uri`] and [`SourceRegistry::open`].
	pub async fn open_uri(
		&self,
		uri: &DataSourceUri,
		auth: &AuthStore,
		transport: Arc<dyn Transport>,
	) -> Result<Arc<dyn TileSource>> {
		let config = SourceConfig::from_uri(uri, auth)?;
		self.open(&config, transport).await
	}
}

impl Default for SourceRegistry {
	fn default() -> Self {
		let mut registry = SourceRegistry::new_empty();

		registry.register(SourceKind::Xyz, |config, transport| async move {
			Ok(Arc::new(XyzSource::open(&config, transport)?) as Arc<dyn TileSource>)
		});

		registry.register(SourceKind::MbTiles, |config, _transport| async move {
			let path = PathBuf::from(&config.url);
			let source = tokio::task::spawn_blocking(move || MbTilesSource::open_path(&path))
				.await
				.map_err(|err| TileError::Archive(format!("opening task failed: {err}")))??;
			Ok(Arc::new(source) as Arc<dyn TileSource>)
		});

		registry.register(SourceKind::ArcGis, |config, transport| async move {
			Ok(Arc::new(ArcGisSource::connect(&config, transport).await?) as Arc<dyn TileSource>)
		});

		registry
	}
}

impl std::fmt::Debug for SourceRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut kinds: Vec<&str> = self.openers.keys().map(SourceKind::as_str).collect();
		kinds.sort_unstable();
		f.debug_struct("SourceRegistry").field("kinds", &kinds).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{AuthHeader, MockTransport};
	use assert_fs::TempDir;
	use pretty_assertions::assert_eq;
	use r2d2_sqlite::rusqlite::Connection;

	fn transport() -> Arc<MockTransport> {
		Arc::new(MockTransport::new())
	}

	#[tokio::test]
	async fn opens_xyz() {
		let registry = SourceRegistry::default();
		let uri = DataSourceUri::xyz("https://a/{z}/{x}/{y}.pbf").with_param("zmax", "9");
		let source = registry.open_uri(&uri, &AuthStore::new(), transport()).await.unwrap();
		assert_eq!(source.kind(), SourceKind::Xyz);
		assert_eq!(source.zoom_range().max, 9);
		assert_eq!(source.name(), "https://a/{z}/{x}/{y}.pbf");
	}

	#[tokio::test]
	async fn opens_arcgis_with_auth() {
		let transport = transport();
		transport.insert("https://a/VectorTileServer", 200, r#"{"tiles":["t/{z}/{y}/{x}"],"maxzoom":4}"#);
		let mut auth = AuthStore::new();
		auth.insert("k1", AuthHeader::new("X-Key", "secret"));

		let uri = DataSourceUri::arcgis("https://a/VectorTileServer").with_param("authcfg", "k1");
		let source = SourceRegistry::default()
			.open_uri(&uri, &auth, transport.clone())
			.await
			.unwrap();
		assert_eq!(source.kind(), SourceKind::ArcGis);
		assert_eq!(transport.requests()[0].auth, Some(AuthHeader::new("X-Key", "secret")));
	}

	#[tokio::test]
	async fn opens_mbtiles() {
		let dir = TempDir::new().unwrap();
		let path = dir.join("a.mbtiles");
		let conn = Connection::open(&path).unwrap();
		conn
			.execute_batch(
				"CREATE TABLE metadata (name TEXT, value TEXT);
				CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);
				INSERT INTO metadata VALUES ('format', 'pbf');",
			)
			.unwrap();
		drop(conn);

		let uri = DataSourceUri::mbtiles(&path.to_string_lossy());
		let source = SourceRegistry::default()
			.open_uri(&uri, &AuthStore::new(), transport())
			.await
			.unwrap();
		assert_eq!(source.kind(), SourceKind::MbTiles);
	}

	#[tokio::test]
	async fn missing_archive_is_an_archive_error() {
		let uri = DataSourceUri::mbtiles("/does/not/exist.mbtiles");
		let err = SourceRegistry::default()
			.open_uri(&uri, &AuthStore::new(), transport())
			.await
			.unwrap_err();
		assert!(matches!(TileError::find(&err), Some(TileError::Archive(_))));
	}

	#[tokio::test]
	async fn unregistered_kind() {
		let registry = SourceRegistry::new_empty();
		assert!(!registry.supports(SourceKind::Xyz));
		let config = SourceConfig::new(SourceKind::Xyz, "https://a/{z}/{x}/{y}");
		let err = registry.open(&config, transport()).await.unwrap_err();
		assert_eq!(
			TileError::find(&err),
			Some(&TileError::Configuration("unsupported source type 'xyz'".into()))
		);
		assert_eq!(format!("{registry:?}"), "SourceRegistry { kinds: [] }");
		assert_eq!(
			format!("{:?}", SourceRegistry::default()),
			"SourceRegistry { kinds: [\"arcgis\", \"mbtiles\", \"xyz\"] }"
		);
	}

	#[tokio::test]
	async fn custom_constructor_replaces_builtin() {
		let mut registry = SourceRegistry::default();
		registry.register(SourceKind::Xyz, |config, transport| async move {
			let source = XyzSource::open(&config, transport)?.with_referer(Some("https://custom".into()));
			Ok(Arc::new(source) as Arc<dyn TileSource>)
		});
		let transport = transport();
		let config = SourceConfig::new(SourceKind::Xyz, "https://a/{z}/{x}/{y}");
		let source = registry.open(&config, transport.clone()).await.unwrap();
		let _ = source.get_tile(&tilefetch_core::TileCoord::new(0, 0, 0).unwrap()).await;
		assert_eq!(transport.requests()[0].referer.as_deref(), Some("https://custom"));
	}
}
