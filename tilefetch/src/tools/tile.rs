use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tilefetch_core::{TileCoord, TileError};
use tokio::io::AsyncWriteExt;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// data source: a data source URI, an *.mbtiles path or an XYZ URL template
	#[arg(required = true)]
	source: String,

	/// tile address as "z/x/y", rows counted from the north
	#[arg(required = true)]
	coord: String,

	/// write the tile to this file instead of stdout
	#[arg(long, short, value_name = "FILE")]
	output: Option<PathBuf>,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand, config: &Config) -> Result<()> {
	let coord: TileCoord = arguments.coord.parse()?;
	let layer = super::load_layer(&arguments.source, config).await?;

	let Some(blob) = layer.get_raw_tile(&coord).await? else {
		return Err(TileError::TileFetch(format!("tile {coord} is not available")).into());
	};
	log::info!("tile {coord}: {} bytes", blob.len());

	match &arguments.output {
		Some(path) => tokio::fs::write(path, blob.as_slice()).await?,
		None => {
			let mut stdout = tokio::io::stdout();
			stdout.write_all(blob.as_slice()).await?;
			stdout.flush().await?;
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;
	use crate::tools::tests::write_archive;
	use assert_fs::TempDir;

	#[test]
	fn tile_to_file() {
		let dir = TempDir::new().unwrap();
		let archive = write_archive(&dir);
		let output = dir.join("tile.pbf");
		run_command(vec![
			"tilefetch",
			"tile",
			"-q",
			archive.to_str().unwrap(),
			"2/1/3",
			"-o",
			output.to_str().unwrap(),
		])
		.unwrap();
		assert_eq!(std::fs::read_to_string(&output).unwrap(), "2/1/3");
	}

	#[test]
	fn unavailable_tile() {
		let dir = TempDir::new().unwrap();
		let archive = write_archive(&dir);
		let err = run_command(vec!["tilefetch", "tile", "-q", archive.to_str().unwrap(), "5/1/3"]).unwrap_err();
		assert_eq!(format!("{err}"), "tile fetch failed: tile 5/1/3 is not available");
	}

	#[test]
	fn invalid_coord() {
		let dir = TempDir::new().unwrap();
		let archive = write_archive(&dir);
		assert!(run_command(vec!["tilefetch", "tile", "-q", archive.to_str().unwrap(), "2/9/9"]).is_err());
	}
}
