use super::{HttpRequest, HttpResponse, Transport};
use anyhow::{Result, bail};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::HashMap, time::Duration};
use tilefetch_core::Blob;

#[derive(Clone, Debug)]
enum Reply {
	Response(HttpResponse),
	Failure(String),
	Delayed(Duration, HttpResponse),
}

/// In-memory [`Transport`] with scripted replies and a request log.
///
/// Unknown URLs answer with status 404.
///
/// ```
/// use tilefetch_source::{HttpRequest, MockTransport, Transport};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
/// 	let transport = MockTransport::new();
/// 	transport.insert("https://a/0/0/0", 200, "tile");
/// 	let response = transport.get(&HttpRequest::new("https://a/0/0/0")).await.unwrap();
/// 	assert_eq!(response.body.as_slice(), b"tile");
/// 	assert_eq!(transport.requested_urls(), vec!["https://a/0/0/0"]);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
	replies: Mutex<HashMap<String, Reply>>,
	requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
	#[must_use]
	pub fn new() -> MockTransport {
		MockTransport::default()
	}

	pub fn insert(&self, url: &str, status: u16, body: impl Into<Blob>) {
		self.set(url, Reply::Response(HttpResponse::new(status, body.into())));
	}

	/// Requests for `url` fail as if the network were unreachable.
	pub fn insert_failure(&self, url: &str, message: &str) {
		self.set(url, Reply::Failure(message.to_string()));
	}

	/// Requests for `url` succeed after `delay`.
	pub fn insert_delayed(&self, url: &str, delay: Duration, body: impl Into<Blob>) {
		self.set(url, Reply::Delayed(delay, HttpResponse::ok(body.into())));
	}

	fn set(&self, url: &str, reply: Reply) {
		self.replies.lock().insert(url.to_string(), reply);
	}

	/// Every request received so far, in arrival order.
	pub fn requests(&self) -> Vec<HttpRequest> {
		self.requests.lock().clone()
	}

	pub fn requested_urls(&self) -> Vec<String> {
		self.requests.lock().iter().map(|r| r.url.clone()).collect()
	}

	pub fn request_count(&self) -> usize {
		self.requests.lock().len()
	}
}

#[async_trait]
impl Transport for MockTransport {
	async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
		self.requests.lock().push(request.clone());
		let reply = self.replies.lock().get(&request.url).cloned();
		match reply {
			Some(Reply::Response(response)) => Ok(response),
			Some(Reply::Failure(message)) => bail!("{message}"),
			Some(Reply::Delayed(delay, response)) => {
				tokio::time::sleep(delay).await;
				Ok(response)
			}
			None => Ok(HttpResponse::not_found()),
		}
	}
}
