//! Tilefetch Source: resolve data-source URIs into tile sources and fetch raw tiles.
//!
//! The building blocks, from the outside in:
//! - [`DataSourceUri`]: the `type=…&url=…` string that names a source,
//! - [`SourceConfig`], [`FetchConfig`], [`AuthStore`]: resolved settings,
//! - [`Transport`]: the network boundary, with [`HttpTransport`] and [`MockTransport`],
//! - [`TileSource`]: XYZ templates ([`XyzSource`]), MBTiles archives ([`MbTilesSource`]) and
//!   ArcGIS vector tile services ([`ArcGisSource`]),
//! - [`SourceRegistry`]: opens the right source for a URI,
//! - [`TileFetcher`]: clips ranges and fetches them concurrently, tolerating failed tiles,
//! - [`VectorTileLayer`]: a named, loaded source with raw tile access.
//!
//! # Quick start
//! ```rust
//! use std::sync::Arc;
//! use tilefetch_core::TileRange;
//! use tilefetch_source::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//! 	let transport = Arc::new(MockTransport::new());
//! 	transport.insert("https://tiles.example.com/0/0/0.pbf", 200, "vector tile");
//!
//! 	let uri: DataSourceUri = "type=xyz&url=https://tiles.example.com/%7Bz%7D/%7Bx%7D/%7By%7D.pbf".parse()?;
//! 	let source = SourceRegistry::default().open_uri(&uri, &AuthStore::new(), transport).await?;
//!
//! 	let tiles = TileFetcher::default().fetch(source.as_ref(), &TileRange::new(0, 0, 0, 0, 0)?).await?;
//! 	assert_eq!(tiles[0].data.as_slice(), b"vector tile");
//! 	Ok(())
//! }
//! ```

mod config;
pub use config::*;

mod fetcher;
pub use fetcher::*;

mod layer;
pub use layer::*;

mod registry;
pub use registry::*;

mod source;
pub use source::*;

mod transport;
pub use transport::*;

mod uri;
pub use uri::*;
