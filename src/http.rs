//! Transport primitives for storefront API calls.
//!
//! The module exposes [`ApiTransport`] alongside the crate-owned [`ApiRequest`] and
//! [`ApiResponse`] types so downstream crates (and tests) can plug in custom HTTP stacks without
//! the client depending on any of them. HTTP error statuses are ordinary responses; only failures
//! to obtain a response at all surface as [`TransportError`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing storefront API requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back a shared client,
/// and the futures they return must be `Send` so requests can hop executors.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes a single request attempt. Retries are the caller's concern.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// HTTP methods used by the storefront API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// A single outbound request attempt.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Fully joined endpoint URL.
	pub url: Url,
	/// JSON-encoded body, if any.
	pub body: Option<Vec<u8>>,
	/// Bearer token to attach as `Authorization`, if a session is active.
	pub bearer: Option<TokenSecret>,
}

/// Response captured from the storefront API.
///
/// Additional fields may be added in future releases, so downstream code should construct values
/// using field names instead of struct update syntax.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Canonical reason phrase for the status, when known.
	pub status_text: Option<String>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with the given status and body and no extra metadata.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, status_text: None, retry_after: None, body: body.into() }
	}

	/// Sets the Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
		self.retry_after = Some(retry_after);

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for `429 Too Many Requests`.
	pub fn is_rate_limited(&self) -> bool {
		self.status == 429
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The default client keeps a cookie store so session cookies set by the API are sent back on
/// later requests, mirroring a browser's `credentials: "include"`.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with a cookie-enabled reqwest client.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().cookie_store(true).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let ApiRequest { method, url, body, bearer } = request;
			let mut builder = client.request(method.into(), url).header(ACCEPT, "application/json");

			if let Some(token) = bearer {
				builder = builder.bearer_auth(token.expose());
			}
			if let Some(body) = body {
				builder = builder.header(CONTENT_TYPE, "application/json").body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse {
				status: status.as_u16(),
				status_text: status.canonical_reason().map(str::to_owned),
				retry_after,
				body,
			})
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;

	parse_retry_after_value(value.to_str().ok()?, OffsetDateTime::now_utc())
}

/// Parses a `Retry-After` value given either as delta-seconds or an HTTP-date.
///
/// Dates in the past yield `None` so callers fall back to their default delay.
pub fn parse_retry_after_value(raw: &str, now: OffsetDateTime) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}

	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - now;

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn retry_after_accepts_delta_seconds() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);

		assert_eq!(parse_retry_after_value("5", now), Some(Duration::seconds(5)));
		assert_eq!(parse_retry_after_value(" 0 ", now), Some(Duration::ZERO));
		assert_eq!(parse_retry_after_value("-3", now), None);
		assert_eq!(parse_retry_after_value("soon", now), None);
	}

	#[test]
	fn retry_after_accepts_http_dates() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);

		assert_eq!(
			parse_retry_after_value("Wed, 01 Jan 2025 00:00:30 +0000", now),
			Some(Duration::seconds(30))
		);
		assert_eq!(parse_retry_after_value("Tue, 31 Dec 2024 23:59:00 +0000", now), None);
	}

	#[test]
	fn response_helpers_classify_statuses() {
		assert!(ApiResponse::new(204, "").is_success());
		assert!(!ApiResponse::new(301, "").is_success());
		assert!(ApiResponse::new(429, "").is_rate_limited());
		assert_eq!(Method::Delete.to_string(), "DELETE");
	}
}
