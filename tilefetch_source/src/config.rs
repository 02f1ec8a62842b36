//! Fetch settings, authentication entries and resolved source configurations.

use crate::DataSourceUri;
use anyhow::Result;
use serde::Deserialize;
use std::{
	collections::HashMap,
	fmt::{self, Debug, Display},
	time::Duration,
};
use tilefetch_core::{TileError, ZoomRange};

/// Time limit of a single request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by every fetch.
///
/// Deserializes from the `fetch` section of the command line configuration; missing fields
/// fall back to the defaults.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
	/// Per-tile timeout in seconds.
	pub timeout_seconds: f64,
	/// Upper bound of requests in flight per fetch.
	pub max_concurrent_requests: usize,
	/// Ranges with more tiles are rejected before any request is made.
	pub max_tiles_per_request: u64,
	pub user_agent: String,
}

impl Default for FetchConfig {
	fn default() -> Self {
		FetchConfig {
			timeout_seconds: DEFAULT_TIMEOUT.as_secs_f64(),
			max_concurrent_requests: (num_cpus::get() * 4).clamp(4, 32),
			max_tiles_per_request: 65_536,
			user_agent: format!("tilefetch/{}", env!("CARGO_PKG_VERSION")),
		}
	}
}

impl FetchConfig {
	#[must_use]
	pub fn timeout(&self) -> Duration {
		Duration::try_from_secs_f64(self.timeout_seconds).unwrap_or(Duration::ZERO)
	}
}

/// A header attached to every request of an authenticated source.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthHeader {
	pub header: String,
	pub value: String,
}

impl AuthHeader {
	#[must_use]
	pub fn new(header: &str, value: &str) -> AuthHeader {
		AuthHeader {
			header: header.to_string(),
			value: value.to_string(),
		}
	}
}

/// The value is a credential and is never printed.
impl Debug for AuthHeader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "AuthHeader({}: ***)", self.header)
	}
}

/// Authentication entries addressed by the opaque `authcfg` id of a data-source URI.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AuthStore {
	entries: HashMap<String, AuthHeader>,
}

impl AuthStore {
	#[must_use]
	pub fn new() -> AuthStore {
		AuthStore::default()
	}

	pub fn insert(&mut self, id: &str, header: AuthHeader) {
		self.entries.insert(id.to_string(), header);
	}

	/// # Errors
	/// Fails with [`TileError::Configuration`] if no entry has this id.
	pub fn resolve(&self, id: &str) -> Result<AuthHeader> {
		self
			.entries
			.get(id)
			.cloned()
			.ok_or_else(|| TileError::Configuration(format!("unknown authentication id '{id}'")).into())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// The backend a data-source URI selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
	Xyz,
	MbTiles,
	ArcGis,
}

impl SourceKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			SourceKind::Xyz => "xyz",
			SourceKind::MbTiles => "mbtiles",
			SourceKind::ArcGis => "arcgis",
		}
	}
}

impl Display for SourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Zoom range of XYZ and MBTiles sources that declare none.
pub const DEFAULT_ZOOM_RANGE: ZoomRange = ZoomRange { min: 0, max: 14 };

/// Everything needed to open a tile source, resolved from a [`DataSourceUri`].
#[derive(Clone, Debug, PartialEq)]
pub struct SourceConfig {
	pub kind: SourceKind,
	/// URL template, service URL or archive path, depending on `kind`.
	pub url: String,
	pub auth: Option<AuthHeader>,
	pub referer: Option<String>,
	/// `zmin` override.
	pub min_zoom: Option<u8>,
	/// `zmax` override.
	pub max_zoom: Option<u8>,
	/// Upper bound for resolving the source, e.g. downloading a service description.
	pub timeout: Duration,
}

impl SourceConfig {
	#[must_use]
	pub fn new(kind: SourceKind, url: &str) -> SourceConfig {
		SourceConfig {
			kind,
			url: url.to_string(),
			auth: None,
			referer: None,
			min_zoom: None,
			max_zoom: None,
			timeout: DEFAULT_TIMEOUT,
		}
	}

	#[must_use]
	pub fn with_timeout(mut self, timeout: Duration) -> SourceConfig {
		self.timeout = timeout;
		self
	}

	/// Resolves the source type, URL, zoom overrides, referer and authentication of `uri`.
	///
	/// `type=xyz` together with `serviceType=arcgis` selects an ArcGIS service.
	///
	/// # Errors
	/// Fails with [`TileError::Configuration`] for a missing or unknown type, a missing URL,
	/// an unparsable zoom override or an unknown authentication id.
	pub fn from_uri(uri: &DataSourceUri, auth: &AuthStore) -> Result<SourceConfig> {
		let kind = match (uri.source_type(), uri.param("serviceType")) {
			(Some("xyz"), Some("arcgis")) => SourceKind::ArcGis,
			(Some("xyz"), _) => SourceKind::Xyz,
			(Some("mbtiles"), _) => SourceKind::MbTiles,
			(Some(other), _) => return Err(configuration(format!("unknown source type '{other}'"))),
			(None, _) => return Err(configuration("missing parameter 'type'".into())),
		};

		let url = uri
			.url()
			.filter(|url| !url.is_empty())
			.ok_or_else(|| configuration("missing parameter 'url'".into()))?;

		Ok(SourceConfig {
			kind,
			url: url.to_string(),
			auth: uri.auth_config_id().map(|id| auth.resolve(id)).transpose()?,
			referer: uri.referer().map(String::from),
			min_zoom: parse_zoom(uri, "zmin")?,
			max_zoom: parse_zoom(uri, "zmax")?,
			timeout: DEFAULT_TIMEOUT,
		})
	}
}

fn configuration(message: String) -> anyhow::Error {
	TileError::Configuration(message).into()
}

fn parse_zoom(uri: &DataSourceUri, key: &str) -> Result<Option<u8>> {
	uri
		.param(key)
		.map(|value| {
			value
				.trim()
				.parse::<u8>()
				.map_err(|_| configuration(format!("'{key}' must be a zoom level, got '{value}'")))
		})
		.transpose()
}
