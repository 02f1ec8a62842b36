//! The optional YAML configuration of the command line tool.
//!
//! ```yaml
//! fetch:
//!   timeout_seconds: 5
//!   max_concurrent_requests: 16
//!   max_tiles_per_request: 10000
//!   user_agent: "my-app/1.0"
//! auth:
//!   esri:
//!     header: "X-Esri-Authorization"
//!     value: "Bearer 0123456789"
//! ```
//!
//! Both sections are optional. `auth` entries are referenced by the `authcfg` parameter of a
//! data-source URI.

use anyhow::Result;
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};
use tilefetch_derive::context;
use tilefetch_source::{AuthStore, FetchConfig};

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Timeouts, concurrency and limits of tile fetches
	#[serde(default)]
	pub fetch: FetchConfig,

	/// Authentication headers by id
	#[serde(default)]
	pub auth: AuthStore,
}

impl Config {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	#[context("reading configuration {path:?}")]
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path)?;
		Config::from_reader(BufReader::new(file))
	}
}
