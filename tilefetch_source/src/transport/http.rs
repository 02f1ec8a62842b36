use super::{HttpRequest, HttpResponse, Transport};
use crate::FetchConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::{Client, header::REFERER};
use std::{io::ErrorKind, time::Duration};
use tilefetch_core::Blob;
use tilefetch_derive::context;

/// [`Transport`] backed by a pooled `reqwest` client.
///
/// `file://` URLs are read from the local filesystem, so XYZ templates may point at a tile
/// directory on disk. A missing file answers with status 404.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
}

impl HttpTransport {
	#[context("building HTTP client")]
	pub fn new(config: &FetchConfig) -> Result<HttpTransport> {
		let client = Client::builder()
			.user_agent(config.user_agent.clone())
			.tcp_keepalive(Duration::from_secs(600))
			.connect_timeout(config.timeout())
			.timeout(config.timeout())
			.build()?;
		Ok(HttpTransport { client })
	}

	async fn get_file(path: &str) -> Result<HttpResponse> {
		let path = percent_decode_str(path).decode_utf8()?;
		match tokio::fs::read(&*path).await {
			Ok(data) => Ok(HttpResponse::ok(Blob::from(data))),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(HttpResponse::not_found()),
			Err(err) => Err(err).with_context(|| format!("reading '{path}'")),
		}
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
		if let Some(path) = request.url.strip_prefix("file://") {
			return HttpTransport::get_file(path).await;
		}

		log::trace!("GET {}", request.url);
		let mut builder = self.client.get(&request.url);
		if let Some(referer) = &request.referer {
			builder = builder.header(REFERER, referer);
		}
		if let Some(auth) = &request.auth {
			builder = builder.header(auth.header.as_str(), auth.value.as_str());
		}

		let response = builder
			.send()
			.await
			.with_context(|| format!("requesting '{}'", request.url))?;
		let status = response.status().as_u16();
		let body = response
			.bytes()
			.await
			.with_context(|| format!("reading response body of '{}'", request.url))?;
		Ok(HttpResponse::new(status, Blob::from(body.to_vec())))
	}
}
