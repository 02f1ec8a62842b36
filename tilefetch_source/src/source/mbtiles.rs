//! Vector tiles from a local MBTiles (SQLite) archive.
//!
//! The archive must declare `format = pbf` in its `metadata` table. `minzoom` and `maxzoom`
//! narrow the default zoom range when they parse, and `bounds` (`west,south,east,north` in
//! degrees) becomes the source extent after projecting it to Web Mercator.
//!
//! MBTiles count rows from the south (TMS), so every lookup flips the row:
//! `tile_row = 2^zoom - 1 - y`.

use super::TileSource;
use crate::{DEFAULT_ZOOM_RANGE, SourceKind};
use anyhow::{Context, Result, bail, ensure};
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::{
	SqliteConnectionManager,
	rusqlite::{OpenFlags, OptionalExtension},
};
use std::{collections::HashMap, fmt::Debug, path::Path};
use tilefetch_core::{Blob, GeoBBox, MercatorExtent, TileCoord, TileError, ZoomRange};
use tilefetch_derive::context;

pub struct MbTilesSource {
	name: String,
	pool: Pool<SqliteConnectionManager>,
	metadata: HashMap<String, String>,
	zoom_range: ZoomRange,
	extent: MercatorExtent,
}

impl MbTilesSource {
	/// Opens the archive read-only and validates its metadata.
	///
	/// # Errors
	/// Fails with [`TileError::Archive`] if the file is missing, is not an SQLite database
	/// with a `metadata` table, or does not hold vector tiles.
	#[context(classify = TileError::Archive, "opening MBTiles archive '{}'", path.display())]
	pub fn open_path(path: &Path) -> Result<MbTilesSource> {
		log::debug!("open {path:?}");

		ensure!(path.is_file(), "file {path:?} does not exist");

		let manager = SqliteConnectionManager::file(path)
			.with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX);
		let pool = Pool::builder()
			.max_size(10)
			.build(manager)
			.context("cannot open database")?;

		let metadata = read_metadata(&pool).context("reading metadata")?;

		match metadata.get("format").map(String::as_str) {
			Some("pbf") => {}
			Some(format) => bail!("tile format is '{format}', only vector tiles ('pbf') are supported"),
			None => bail!("metadata has no 'format' entry"),
		}

		let declared_zoom = |key: &str| metadata.get(key).and_then(|value| value.trim().parse::<u8>().ok());
		let zoom_range = DEFAULT_ZOOM_RANGE.with_declared(declared_zoom("minzoom"), declared_zoom("maxzoom"));

		let extent = match metadata.get("bounds").map(|bounds| bounds.parse::<GeoBBox>()) {
			Some(Ok(bbox)) => bbox.to_mercator(),
			Some(Err(err)) => {
				log::warn!("ignoring bounds of {path:?}: {err:#}");
				MercatorExtent::WORLD
			}
			None => MercatorExtent::WORLD,
		};

		log::debug!(
			"name: {:?}, zoom range: {zoom_range}, extent: {extent:?}",
			metadata.get("name")
		);

		Ok(MbTilesSource {
			name: path.to_string_lossy().into_owned(),
			pool,
			metadata,
			zoom_range,
			extent,
		})
	}

	/// A raw entry of the `metadata` table.
	pub fn metadata_value(&self, key: &str) -> Option<&str> {
		self.metadata.get(key).map(String::as_str)
	}
}

fn read_metadata(pool: &Pool<SqliteConnectionManager>) -> Result<HashMap<String, String>> {
	let conn = pool.get()?;
	let mut stmt = conn.prepare("SELECT name, value FROM metadata")?;
	let entries = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
	Ok(entries.collect::<Result<HashMap<_, _>, _>>()?)
}

#[async_trait]
impl TileSource for MbTilesSource {
	fn kind(&self) -> SourceKind {
		SourceKind::MbTiles
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn zoom_range(&self) -> ZoomRange {
		self.zoom_range
	}

	fn extent(&self) -> MercatorExtent {
		self.extent
	}

	async fn get_tile(&self, coord: &TileCoord) -> Result<Blob> {
		let coord = *coord;
		let Some(row) = coord.tms_row().filter(|_| coord.is_valid()) else {
			return Err(TileError::TileFetch(format!("tile {coord} lies outside the grid of level {}", coord.level)).into());
		};
		log::trace!("read tile {coord:?} (tile_row {row})");

		let pool = self.pool.clone();
		let query = tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>> {
			let conn = pool.get()?;
			let mut stmt = conn
				.prepare_cached("SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3")?;
			Ok(stmt
				.query_row([u32::from(coord.level), coord.x, row], |r| r.get::<_, Vec<u8>>(0))
				.optional()?)
		})
		.await;

		match query {
			Ok(Ok(Some(data))) => Ok(Blob::from(data)),
			Ok(Ok(None)) => Err(TileError::TileFetch(format!("tile {coord} is not in '{}'", self.name)).into()),
			Ok(Err(err)) => Err(TileError::TileFetch(format!("querying tile {coord}: {err:#}")).into()),
			Err(err) => Err(TileError::TileFetch(format!("query task for tile {coord} failed: {err}")).into()),
		}
	}
}

impl Debug for MbTilesSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MbTilesSource")
			.field("name", &self.name)
			.field("zoom_range", &self.zoom_range)
			.field("extent", &self.extent)
			.finish_non_exhaustive()
	}
}
