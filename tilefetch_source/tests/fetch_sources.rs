//! Integration tests fetching tile ranges from real files through the public API.

use anyhow::Result;
use r2d2_sqlite::rusqlite::{Connection, params};
use std::{path::Path, sync::Arc};
use tempfile::TempDir;
use tilefetch_core::*;
use tilefetch_source::*;

/// Writes a vector tile archive whose tiles contain their own XYZ address.
fn write_archive(path: &Path, level: u8) -> Result<()> {
	let conn = Connection::open(path)?;
	conn.execute_batch(
		"CREATE TABLE metadata (name TEXT, value TEXT);
		CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);
		INSERT INTO metadata VALUES ('format', 'pbf'), ('name', 'fixture'), ('minzoom', '0'), ('maxzoom', '3');",
	)?;
	let matrix = TileMatrix::from_web_mercator(level)?;
	for coord in matrix.full_range().iter_coords() {
		// leave one tile out
		if coord.x == 1 && coord.y == 2 {
			continue;
		}
		conn.execute(
			"INSERT INTO tiles VALUES (?1, ?2, ?3, ?4)",
			params![coord.level, coord.x, coord.tms_row().unwrap(), coord.to_string()],
		)?;
	}
	Ok(())
}

#[tokio::test]
async fn mbtiles_range_fetch() -> Result<()> {
	let dir = TempDir::new()?;
	let path = dir.path().join("fixture.mbtiles");
	write_archive(&path, 2)?;

	let transport: Arc<dyn Transport> = Arc::new(MockTransport::new());
	let uri = DataSourceUri::mbtiles(&path.to_string_lossy());
	let source = SourceRegistry::default()
		.open_uri(&uri, &AuthStore::new(), transport)
		.await?;
	assert_eq!(source.zoom_range(), ZoomRange::new(0, 3)?);

	let fetcher = TileFetcher::default();
	let report = fetcher.fetch_report(source.as_ref(), &TileRange::new(2, 0, 3, 1, 2)?).await?;

	assert_eq!(report.tiles.len(), 7);
	for tile in &report.tiles {
		assert_eq!(tile.data.as_str_lossy(), tile.coord.to_string());
	}
	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].coord, TileCoord::new(2, 1, 2)?);
	assert!(!report.failures[0].error.is_fatal());
	Ok(())
}

#[tokio::test]
async fn mbtiles_bbox_fetch() -> Result<()> {
	let dir = TempDir::new()?;
	let path = dir.path().join("fixture.mbtiles");
	write_archive(&path, 3)?;
	let source = MbTilesSource::open_path(&path)?;

	// central Europe at zoom 3 is tile (4, 2)
	let range = TileRange::from_geo(3, &"5,45,15,55".parse()?)?;
	let tiles = TileFetcher::default().fetch(&source, &range).await?;
	let coords: Vec<String> = tiles.iter().map(|t| t.coord.to_string()).collect();
	assert_eq!(coords, vec!["3/4/2"]);
	Ok(())
}

#[tokio::test]
async fn file_templates_through_http_transport() -> Result<()> {
	let dir = TempDir::new()?;
	for (x, y) in [(0, 0), (1, 1)] {
		let tile_dir = dir.path().join(format!("1/{x}"));
		std::fs::create_dir_all(&tile_dir)?;
		std::fs::write(tile_dir.join(format!("{y}.pbf")), format!("tile {x} {y}"))?;
	}

	let transport = Arc::new(HttpTransport::new(&FetchConfig::default())?);
	let template = format!("file://{}/{{z}}/{{x}}/{{y}}.pbf", dir.path().display());
	let source = SourceRegistry::default()
		.open_uri(&DataSourceUri::xyz(&template), &AuthStore::new(), transport)
		.await?;

	let report = TileFetcher::default()
		.fetch_report(source.as_ref(), &TileRange::new(1, 0, 1, 0, 1)?)
		.await?;
	let payloads: Vec<String> = report.tiles.iter().map(|t| t.data.as_str_lossy().into_owned()).collect();
	assert_eq!(payloads, vec!["tile 0 0", "tile 1 1"]);
	assert_eq!(report.failures.len(), 2);
	Ok(())
}

#[test]
fn blocking_fetch_from_archive() -> Result<()> {
	let dir = TempDir::new()?;
	let path = dir.path().join("fixture.mbtiles");
	write_archive(&path, 1)?;
	let source = MbTilesSource::open_path(&path)?;

	let tiles = TileFetcher::default().fetch_blocking(&source, &TileRange::new(1, 0, 1, 0, 1)?)?;
	assert_eq!(tiles.len(), 4);
	Ok(())
}
