pub mod fetch;
pub mod probe;
pub mod tile;

use crate::config::Config;
use anyhow::Result;
use std::sync::Arc;
use tilefetch_core::TileError;
use tilefetch_source::{DataSourceUri, HttpTransport, SourceRegistry, VectorTileLayer};

/// Accepts a full data-source URI, a path to an `.mbtiles` file or an XYZ URL template.
pub fn parse_source(text: &str) -> Result<DataSourceUri> {
	if text.contains("type=") {
		return text.parse();
	}
	if text.ends_with(".mbtiles") {
		return Ok(DataSourceUri::mbtiles(text));
	}
	if text.contains("{z}") {
		return Ok(DataSourceUri::xyz(text));
	}
	Err(TileError::Configuration(format!(
		"'{text}' is neither a data source URI, an MBTiles path nor an XYZ URL template"
	))
	.into())
}

/// Opens `source` as a layer, with the network transport configured by `config`.
pub async fn load_layer(source: &str, config: &Config) -> Result<VectorTileLayer> {
	let uri = parse_source(source)?;
	let transport = Arc::new(HttpTransport::new(&config.fetch)?);
	VectorTileLayer::load(
		"cli",
		&uri,
		&config.auth,
		&SourceRegistry::default(),
		transport,
		&config.fetch,
	)
	.await
}

#[cfg(test)]
pub mod tests {
	use super::*;
	use r2d2_sqlite::rusqlite::{Connection, params};
	use rstest::rstest;
	use std::path::{Path, PathBuf};
	use tilefetch_core::TileMatrix;

	/// Writes `berlin.mbtiles` to `dir` with every tile of zoom levels 0 to 2, each holding
	/// its own `z/x/y` address.
	pub fn write_archive(dir: &Path) -> PathBuf {
		let path = dir.join("berlin.mbtiles");
		let conn = Connection::open(&path).unwrap();
		conn
			.execute_batch(
				"CREATE TABLE metadata (name TEXT, value TEXT);
				CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);
				INSERT INTO metadata VALUES ('format', 'pbf'), ('name', 'Berlin'), ('minzoom', '0'), ('maxzoom', '2');",
			)
			.unwrap();
		for level in 0..=2 {
			for coord in TileMatrix::from_web_mercator(level).unwrap().full_range().iter_coords() {
				conn
					.execute(
						"INSERT INTO tiles VALUES (?1, ?2, ?3, ?4)",
						params![coord.level, coord.x, coord.tms_row().unwrap(), coord.to_string()],
					)
					.unwrap();
			}
		}
		path
	}

	#[rstest]
	#[case("type=mbtiles&url=/a.mbtiles", Some("mbtiles"), "/a.mbtiles")]
	#[case("/data/berlin.mbtiles", Some("mbtiles"), "/data/berlin.mbtiles")]
	#[case("https://a/{z}/{x}/{y}.pbf", Some("xyz"), "https://a/{z}/{x}/{y}.pbf")]
	fn source_arguments(#[case] text: &str, #[case] kind: Option<&str>, #[case] url: &str) {
		let uri = parse_source(text).unwrap();
		assert_eq!(uri.source_type(), kind);
		assert_eq!(uri.url(), Some(url));
	}

	#[test]
	fn unknown_source_argument() {
		let err = parse_source("berlin.pmtiles").unwrap_err();
		assert!(matches!(TileError::find(&err), Some(TileError::Configuration(_))));
	}
}
