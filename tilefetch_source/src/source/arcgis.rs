//! ArcGIS vector tile services.
//!
//! Connecting downloads the service description (`<service>?f=pjson` style documents, the URL
//! is used as given) and derives an XYZ source from it:
//!
//! ```json
//! { "name": "Basemap", "tiles": ["tile/{z}/{y}/{x}.pbf"], "maxzoom": 15,
//!   "defaultStyles": "resources/styles", "copyrightText": "Esri", "serviceItemId": "abc" }
//! ```
//!
//! Tile URLs become `<service>/<tiles[0]>`, the zoom range is `0..=maxzoom`.

use super::{TileSource, XyzSource};
use crate::{HttpRequest, SourceConfig, SourceKind, Transport};
use anyhow::{Context, Result, anyhow, bail, ensure};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{fmt::Debug, sync::Arc, time::Duration};
use tilefetch_core::{Blob, MercatorExtent, TileCoord, TileError, ZoomRange};
use tilefetch_derive::context;

/// A link entry of [`LayerMetadata`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetadataLink {
	pub name: String,
	#[serde(rename = "type")]
	pub link_type: String,
	pub url: String,
}

/// Descriptive metadata of a layer, as derived from an ArcGIS service document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LayerMetadata {
	pub identifier: String,
	pub parent_identifier: Option<String>,
	#[serde(rename = "type")]
	pub kind: String,
	pub title: String,
	pub rights: Vec<String>,
	pub links: Vec<MetadataLink>,
}

pub struct ArcGisSource {
	service_uri: String,
	document: Map<String, Value>,
	xyz: XyzSource,
	transport: Arc<dyn Transport>,
	timeout: Duration,
}

impl ArcGisSource {
	/// Resolves the service at `config.url`.
	///
	/// # Errors
	/// Fails with [`TileError::ServiceResolution`] if the description cannot be downloaded
	/// within `config.timeout`, is not a JSON object, reports an `error`, or does not name a
	/// usable tile template.
	#[context(classify = TileError::ServiceResolution, "resolving ArcGIS service '{}'", config.url)]
	pub async fn connect(config: &SourceConfig, transport: Arc<dyn Transport>) -> Result<ArcGisSource> {
		let service_uri = config.url.trim_end_matches('/').to_string();
		log::debug!("resolving ArcGIS service '{service_uri}'");

		let request = HttpRequest::new(&config.url)
			.with_referer(config.referer.as_deref())
			.with_auth(config.auth.as_ref());

		let document = tokio::time::timeout(config.timeout, download_document(transport.as_ref(), &request))
			.await
			.map_err(|_| anyhow!("service description timed out after {:?}", config.timeout))??;

		let xyz = resolve_tiles(&service_uri, &document, transport.clone())?
			.with_auth(config.auth.clone())
			.with_referer(config.referer.clone());

		log::debug!("ArcGIS service '{service_uri}' serves '{}' at zoom {}", xyz.template(), xyz.zoom_range());

		Ok(ArcGisSource {
			service_uri,
			document,
			xyz,
			transport,
			timeout: config.timeout,
		})
	}

	pub fn service_uri(&self) -> &str {
		&self.service_uri
	}

	/// The service description as downloaded.
	pub fn document(&self) -> &Map<String, Value> {
		&self.document
	}

	fn text(&self, key: &str) -> Option<&str> {
		self.document.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
	}

	/// Location of the service's default style, if the service names one.
	pub fn default_style_url(&self) -> Option<String> {
		self
			.text("defaultStyles")
			.map(|path| format!("{}/{}", self.service_uri, path.trim_start_matches('/')))
	}

	/// Downloads the default style document. The style is returned as served; converting
	/// it is up to the caller.
	///
	/// # Errors
	/// Fails with [`TileError::ServiceResolution`] if the service names no style or the
	/// style cannot be downloaded or parsed.
	pub async fn load_default_style(&self) -> Result<Value> {
		let url = self
			.default_style_url()
			.ok_or_else(|| TileError::ServiceResolution(format!("service '{}' has no default style", self.service_uri)))?;
		log::debug!("loading default style '{url}'");

		let response = tokio::time::timeout(self.timeout, self.transport.get(&self.xyz.request(&url)))
			.await
			.map_err(|_| TileError::ServiceResolution(format!("style '{url}' timed out after {:?}", self.timeout)))?
			.map_err(|err| TileError::ServiceResolution(format!("requesting style '{url}': {err:#}")))?;
		if !response.is_ok() {
			return Err(TileError::ServiceResolution(format!("HTTP {} for style '{url}'", response.status)).into());
		}
		serde_json::from_slice(response.body.as_slice())
			.map_err(|err| TileError::ServiceResolution(format!("parsing style '{url}': {err}")).into())
	}

	pub fn layer_metadata(&self) -> LayerMetadata {
		LayerMetadata {
			identifier: self.service_uri.clone(),
			parent_identifier: self.text("serviceItemId").map(String::from),
			kind: "dataset".to_string(),
			title: self.text("name").unwrap_or_default().to_string(),
			rights: self.text("copyrightText").map(String::from).into_iter().collect(),
			links: vec![MetadataLink {
				name: "Source".to_string(),
				link_type: "WWW:LINK".to_string(),
				url: self.service_uri.clone(),
			}],
		}
	}

	/// The XYZ source the service resolved to.
	pub fn tiles(&self) -> &XyzSource {
		&self.xyz
	}
}

async fn download_document(transport: &dyn Transport, request: &HttpRequest) -> Result<Map<String, Value>> {
	let response = transport.get(request).await.context("downloading service description")?;
	ensure!(response.is_ok(), "service description answered with HTTP {}", response.status);

	let value: Value = serde_json::from_slice(response.body.as_slice()).context("parsing service description")?;
	let Value::Object(document) = value else {
		bail!("service description is not a JSON object");
	};
	if let Some(error) = document.get("error") {
		bail!("service reported an error: {error}");
	}
	Ok(document)
}

fn resolve_tiles(service_uri: &str, document: &Map<String, Value>, transport: Arc<dyn Transport>) -> Result<XyzSource> {
	let path = document
		.get("tiles")
		.and_then(Value::as_array)
		.and_then(|tiles| tiles.first())
		.and_then(Value::as_str)
		.ok_or_else(|| anyhow!("service description lists no tile URL"))?;
	let template = format!("{service_uri}/{}", path.trim_start_matches('/'));

	let max_zoom = match document.get("maxzoom") {
		None | Some(Value::Null) => 0,
		Some(value) => value
			.as_u64()
			.and_then(|zoom| u8::try_from(zoom).ok())
			.ok_or_else(|| anyhow!("invalid maxzoom {value}"))?,
	};
	let zoom_range = ZoomRange::new(0, max_zoom)?;

	XyzSource::new(&template, zoom_range, transport)
}

#[async_trait]
impl TileSource for ArcGisSource {
	fn kind(&self) -> SourceKind {
		SourceKind::ArcGis
	}

	fn name(&self) -> &str {
		&self.service_uri
	}

	fn zoom_range(&self) -> ZoomRange {
		self.xyz.zoom_range()
	}

	fn extent(&self) -> MercatorExtent {
		self.xyz.extent()
	}

	async fn get_tile(&self, coord: &TileCoord) -> Result<Blob> {
		self.xyz.get_tile(coord).await
	}

	fn as_arcgis(&self) -> Option<&ArcGisSource> {
		Some(self)
	}
}

impl Debug for ArcGisSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ArcGisSource")
			.field("service_uri", &self.service_uri)
			.field("tiles", &self.xyz)
			.finish_non_exhaustive()
	}
}
