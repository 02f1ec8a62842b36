//! Data-source URIs: the string form that selects and configures a tile source.
//!
//! A URI is a list of `key=value` pairs separated by `&`, with keys and values
//! percent-encoded:
//!
//! ```text
//! type=xyz&url=https://tiles.example.com/%7Bz%7D/%7Bx%7D/%7By%7D.pbf&zmax=14
//! type=mbtiles&url=/data/berlin.mbtiles
//! type=xyz&serviceType=arcgis&url=https://example.com/VectorTileServer
//! ```
//!
//! Known keys are `type`, `url`, `serviceType`, `zmin`, `zmax`, `authcfg` and `referer`;
//! others are preserved untouched.
//!
//! [`DataSourceUri`] values are immutable. Every modification returns a new value.

use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::{
	fmt::{self, Debug, Display},
	path::{Component, Path, PathBuf},
	str::FromStr,
};
use tilefetch_core::TileError;
use tilefetch_derive::context;

/// Characters that stay readable in encoded values, so URLs remain recognisable.
const VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'~')
	.remove(b'/')
	.remove(b':');

const FILE_URL_PREFIX: &str = "file://";
const RELATIVE_FILE_URL_PREFIX: &str = "file:";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct DataSourceUri {
	params: Vec<(String, String)>,
}

impl DataSourceUri {
	#[must_use]
	pub fn new() -> DataSourceUri {
		DataSourceUri::default()
	}

	/// URI of a remote (or `file://`) XYZ template.
	#[must_use]
	pub fn xyz(template: &str) -> DataSourceUri {
		DataSourceUri::new().with_param("type", "xyz").with_param("url", template)
	}

	/// URI of a local MBTiles archive.
	#[must_use]
	pub fn mbtiles(path: &str) -> DataSourceUri {
		DataSourceUri::new().with_param("type", "mbtiles").with_param("url", path)
	}

	/// URI of an ArcGIS vector tile service.
	#[must_use]
	pub fn arcgis(service_uri: &str) -> DataSourceUri {
		DataSourceUri::xyz(service_uri).with_param("serviceType", "arcgis")
	}

	/// Parses the encoded form. Empty segments are ignored.
	///
	/// # Errors
	/// Fails with [`TileError::Configuration`] if a segment has no `=` or does not decode to
	/// UTF-8.
	#[context("parsing data source URI '{encoded}'")]
	pub fn parse(encoded: &str) -> Result<DataSourceUri> {
		let mut params = Vec::new();
		for segment in encoded.split('&').filter(|segment| !segment.is_empty()) {
			let (key, value) = segment
				.split_once('=')
				.ok_or_else(|| TileError::Configuration(format!("parameter '{segment}' has no value")))?;
			params.push((decode(key)?, decode(value)?));
		}
		Ok(DataSourceUri { params })
	}

	/// First value of `key`.
	pub fn param(&self, key: &str) -> Option<&str> {
		self
			.params
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	pub fn has_param(&self, key: &str) -> bool {
		self.param(key).is_some()
	}

	/// A copy with `key` set to `value`. Existing values of `key` are replaced.
	#[must_use]
	pub fn with_param(&self, key: &str, value: &str) -> DataSourceUri {
		let mut uri = self.without_param(key);
		uri.params.push((key.to_string(), value.to_string()));
		uri
	}

	/// A copy without any value of `key`.
	#[must_use]
	pub fn without_param(&self, key: &str) -> DataSourceUri {
		DataSourceUri {
			params: self.params.iter().filter(|(k, _)| k != key).cloned().collect(),
		}
	}

	pub fn source_type(&self) -> Option<&str> {
		self.param("type")
	}

	pub fn url(&self) -> Option<&str> {
		self.param("url")
	}

	/// Id of the authentication entry to use, if any.
	pub fn auth_config_id(&self) -> Option<&str> {
		self.param("authcfg").filter(|id| !id.is_empty())
	}

	pub fn referer(&self) -> Option<&str> {
		self.param("referer").filter(|referer| !referer.is_empty())
	}

	pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
		self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// The encoded form.
	pub fn encode(&self) -> String {
		self
			.params
			.iter()
			.map(|(k, v)| {
				format!(
					"{}={}",
					utf8_percent_encode(k, VALUE_ENCODE_SET),
					utf8_percent_encode(v, VALUE_ENCODE_SET)
				)
			})
			.collect::<Vec<_>>()
			.join("&")
	}

	/// Rewrites a local `url` relative to `base_dir`, for storing alongside a project.
	///
	/// MBTiles paths become `./…` (or `../…`) paths, `file://` XYZ templates become
	/// `file:./…`. Remote URLs and already relative paths are returned unchanged.
	#[must_use]
	pub fn encode_relative(&self, base_dir: &Path) -> DataSourceUri {
		let Some(url) = self.url() else {
			return self.clone();
		};
		let relative = match self.source_type() {
			Some("mbtiles") => relative_path(Path::new(url), base_dir),
			Some("xyz") => url
				.strip_prefix(FILE_URL_PREFIX)
				.and_then(|local| relative_path(Path::new(local), base_dir))
				.map(|local| format!("{RELATIVE_FILE_URL_PREFIX}{local}")),
			_ => None,
		};
		match relative {
			Some(url) => self.with_param("url", &url),
			None => self.clone(),
		}
	}

	/// Inverse of [`DataSourceUri::encode_relative`]: resolves a relative local `url`
	/// against `base_dir`.
	#[must_use]
	pub fn decode_relative(&self, base_dir: &Path) -> DataSourceUri {
		let Some(url) = self.url() else {
			return self.clone();
		};
		let absolute = match self.source_type() {
			Some("mbtiles") => absolute_path(Path::new(url), base_dir),
			Some("xyz") if !url.starts_with(FILE_URL_PREFIX) => url
				.strip_prefix(RELATIVE_FILE_URL_PREFIX)
				.and_then(|local| absolute_path(Path::new(local), base_dir))
				.map(|local| format!("{FILE_URL_PREFIX}{local}")),
			_ => None,
		};
		match absolute {
			Some(url) => self.with_param("url", &url),
			None => self.clone(),
		}
	}
}

fn decode(input: &str) -> Result<String> {
	Ok(percent_decode_str(input)
		.decode_utf8()
		.map_err(|_| TileError::Configuration(format!("'{input}' is not valid UTF-8 after decoding")))?
		.into_owned())
}

/// Lexically removes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
	let mut result = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				result.pop();
			}
			other => result.push(other),
		}
	}
	result
}

/// `path` relative to `base`, always starting with `./` or `../`. `None` unless both are
/// absolute.
fn relative_path(path: &Path, base: &Path) -> Option<String> {
	if !path.is_absolute() || !base.is_absolute() {
		return None;
	}
	let target = normalize(path);
	let base = normalize(base);
	let target: Vec<Component> = target.components().collect();
	let base: Vec<Component> = base.components().collect();
	let common = target.iter().zip(&base).take_while(|(a, b)| a == b).count();

	let ups = base.len() - common;
	let mut parts: Vec<String> = if ups == 0 {
		vec![String::from(".")]
	} else {
		vec![String::from(".."); ups]
	};
	parts.extend(
		target[common..]
			.iter()
			.map(|c| c.as_os_str().to_string_lossy().into_owned()),
	);
	Some(parts.join("/"))
}

/// `path` resolved against `base`. `None` if `path` is already absolute.
fn absolute_path(path: &Path, base: &Path) -> Option<String> {
	if path.is_absolute() {
		return None;
	}
	Some(normalize(&base.join(path)).to_string_lossy().into_owned())
}

impl Display for DataSourceUri {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.encode())
	}
}

impl Debug for DataSourceUri {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "DataSourceUri({})", self.encode())
	}
}

impl FromStr for DataSourceUri {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<DataSourceUri> {
		DataSourceUri::parse(s)
	}
}

impl TryFrom<&str> for DataSourceUri {
	type Error = anyhow::Error;

	fn try_from(value: &str) -> Result<DataSourceUri> {
		DataSourceUri::parse(value).context("invalid data source URI")
	}
}
