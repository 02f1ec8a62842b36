//! The network boundary of every tile source.
//!
//! Sources never talk to the network directly: they hand an [`HttpRequest`] to a shared
//! [`Transport`] and receive an [`HttpResponse`]. [`HttpTransport`] does real requests,
//! [`MockTransport`] answers from memory.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use crate::AuthHeader;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use tilefetch_core::Blob;

/// A GET request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
	pub url: String,
	pub referer: Option<String>,
	pub auth: Option<AuthHeader>,
}

impl HttpRequest {
	#[must_use]
	pub fn new(url: &str) -> HttpRequest {
		HttpRequest {
			url: url.to_string(),
			referer: None,
			auth: None,
		}
	}

	#[must_use]
	pub fn with_referer(mut self, referer: Option<&str>) -> HttpRequest {
		self.referer = referer.map(String::from);
		self
	}

	#[must_use]
	pub fn with_auth(mut self, auth: Option<&AuthHeader>) -> HttpRequest {
		self.auth = auth.cloned();
		self
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	pub status: u16,
	pub body: Blob,
}

impl HttpResponse {
	#[must_use]
	pub fn new(status: u16, body: Blob) -> HttpResponse {
		HttpResponse { status, body }
	}

	#[must_use]
	pub fn ok(body: Blob) -> HttpResponse {
		HttpResponse::new(200, body)
	}

	#[must_use]
	pub fn not_found() -> HttpResponse {
		HttpResponse::new(404, Blob::new_empty())
	}

	pub fn is_ok(&self) -> bool {
		self.status == 200
	}
}

/// Performs GET requests.
///
/// An `Err` means the request could not be completed at all (connection refused, DNS,
/// timeout, unreadable file). HTTP error statuses are regular responses.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
	async fn get(&self, request: &HttpRequest) -> Result<HttpResponse>;
}
