use assert_cmd::{Command, cargo};
use predicates::str;
use rstest::rstest;

#[cfg(windows)]
const BINARY_NAME: &str = "tilefetch.exe";
#[cfg(not(windows))]
const BINARY_NAME: &str = "tilefetch";

#[test]
fn command() -> Result<(), Box<dyn std::error::Error>> {
	Command::new(cargo::cargo_bin!())
		.assert()
		.failure()
		.code(2)
		.stdout(str::is_empty())
		.stderr(str::contains(format!("Usage: {BINARY_NAME} [OPTIONS] <COMMAND>")));
	Ok(())
}

#[rstest]
#[case("probe", "[OPTIONS] <SOURCE>")]
#[case("tile", "[OPTIONS] <SOURCE> <COORD>")]
#[case("fetch", "[OPTIONS] --zoom <ZOOM> --output <DIR> <SOURCE>")]
fn subcommand(#[case] sub_command: &str, #[case] usage: &str) -> Result<(), Box<dyn std::error::Error>> {
	Command::new(cargo::cargo_bin!())
		.arg(sub_command)
		.assert()
		.failure()
		.code(2)
		.stdout(str::is_empty())
		.stderr(str::contains(format!("Usage: {BINARY_NAME} {sub_command} {usage}")));
	Ok(())
}

#[test]
fn probe_xyz_template() -> Result<(), Box<dyn std::error::Error>> {
	Command::new(cargo::cargo_bin!())
		.args(["probe", "file:///does/not/matter/{z}/{x}/{y}.pbf"])
		.assert()
		.success()
		.stdout(str::contains("source type: xyz"))
		.stdout(str::contains("zoom levels: 0 to 14"));
	Ok(())
}

#[test]
fn invalid_source() -> Result<(), Box<dyn std::error::Error>> {
	Command::new(cargo::cargo_bin!())
		.args(["probe", "type=wms&url=x"])
		.assert()
		.failure()
		.stderr(str::contains("unknown source type 'wms'"));
	Ok(())
}
