use crate::config::Config;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// data source you want to probe:
	/// a data source URI ("type=xyz&url=..."), an *.mbtiles path or an XYZ URL template
	#[arg(required = true, verbatim_doc_comment)]
	source: String,

	/// also download and print the default style, if the source has one
	#[arg(long, short)]
	style: bool,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand, config: &Config) -> Result<()> {
	eprintln!("probe {:?}", arguments.source);

	let layer = super::load_layer(&arguments.source, config).await?;
	let extent = layer.source().extent();

	print!("{}", layer.summary());
	println!(
		"extent:      [{:.2}, {:.2}, {:.2}, {:.2}]",
		extent.x_min, extent.y_min, extent.x_max, extent.y_max
	);

	if let Some(metadata) = layer.default_metadata() {
		println!("metadata:    {}", serde_json::to_string_pretty(&metadata)?);
	}

	if arguments.style {
		match layer.load_default_style().await? {
			Some(style) => println!("{}", serde_json::to_string_pretty(&style)?),
			None => eprintln!("source has no default style"),
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
	fn probe_archive() {
		let dir = TempDir::new().unwrap();
		let path = write_archive(&dir);
		run_command(vec!["tilefetch", "probe", "-q", path.to_str().unwrap()]).unwrap();
	}

	#[test]
	fn probe_missing_archive() {
		let err = run_command(vec!["tilefetch", "probe", "-q", "/does/not/exist.mbtiles"]).unwrap_err();
		assert!(format!("{err:#}").contains("does not exist"));
	}
}
