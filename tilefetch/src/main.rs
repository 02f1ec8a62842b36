mod config;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use config::Config;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about = "Fetches raw vector tiles from XYZ servers, MBTiles archives and ArcGIS vector tile services.",
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// YAML file with `fetch` settings and `auth` entries
	#[arg(long, short, global = true, value_name = "FILE")]
	config: Option<PathBuf>,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Show information about a tile source
	Probe(tools::probe::Subcommand),

	/// Fetch a single tile
	Tile(tools::tile::Subcommand),

	/// Fetch all tiles of a zoom level, optionally limited to a bounding box
	Fetch(tools::fetch::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	let config = match &cli.config {
		Some(path) => Config::from_path(path)?,
		None => Config::default(),
	};
	log::debug!("configuration: {config:?}");

	match &cli.command {
		Commands::Probe(arguments) => tools::probe::run(arguments, &config),
		Commands::Tile(arguments) => tools::tile::run(arguments, &config),
		Commands::Fetch(arguments) => tools::fetch::run(arguments, &config),
	}
}
