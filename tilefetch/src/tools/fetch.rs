use crate::config::Config;
use anyhow::{Result, ensure};
use clap::Args;
use std::path::{Path, PathBuf};
use tilefetch_core::{GeoBBox, TileMatrix, TileRange};
use tilefetch_source::RawTileData;
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// data source: a data source URI, an *.mbtiles path or an XYZ URL template
	#[arg(required = true)]
	source: String,

	/// zoom level to fetch
	#[arg(long, short)]
	zoom: u8,

	/// limit to a bounding box "west,south,east,north" in degrees
	#[arg(long, short, allow_hyphen_values = true)]
	bbox: Option<GeoBBox>,

	/// directory to write the tiles to, as "<z>/<x>/<y>.pbf"
	#[arg(long, short, value_name = "DIR")]
	output: PathBuf,
}

impl Subcommand {
	fn range(&self) -> Result<TileRange> {
		match &self.bbox {
			Some(bbox) => TileRange::from_geo(self.zoom, bbox),
			None => Ok(TileMatrix::from_web_mercator(self.zoom)?.full_range()),
		}
	}
}

#[tokio::main]
pub async fn run(arguments: &Subcommand, config: &Config) -> Result<()> {
	let range = arguments.range()?;
	let layer = super::load_layer(&arguments.source, config).await?;
	eprintln!("fetch {range:?} from {:?}", arguments.source);

	let cancel = CancellationToken::new();
	let on_interrupt = cancel.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			log::warn!("interrupted, stopping fetch");
			on_interrupt.cancel();
		}
	});

	let report = layer
		.fetcher()
		.fetch_cancellable(layer.source().as_ref(), &range, cancel)
		.await?;

	for failure in &report.failures {
		log::debug!("{}: {}", failure.coord, failure.error);
	}
	for tile in &report.tiles {
		write_tile(&arguments.output, tile).await?;
	}

	eprintln!(
		"{} tiles written, {} failed{}",
		report.tiles.len(),
		report.failures.len(),
		if report.cancelled { ", cancelled" } else { "" }
	);
	ensure!(!report.cancelled, "fetch was interrupted");
	Ok(())
}

async fn write_tile(base: &Path, tile: &RawTileData) -> Result<()> {
	let coord = &tile.coord;
	let dir = base.join(coord.level.to_string()).join(coord.x.to_string());
	tokio::fs::create_dir_all(&dir).await?;
	tokio::fs::write(dir.join(format!("{}.pbf", coord.y)), tile.data.as_slice()).await?;
	Ok(())
}
