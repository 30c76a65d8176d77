//! Client-level error types shared across requests, resources, pollers, and stores.
//!
//! Every error is `Clone` because a de-duplicated request hands the same outcome to each
//! waiting caller.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn StdError + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Session store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The API answered with an error status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Transport failure (DNS, TCP, TLS) that survived every retry.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the expected type.
	#[error("Response from `{endpoint}` could not be decoded.")]
	Decode {
		/// Endpoint that produced the body.
		endpoint: String,
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
	},
}
impl Error {
	/// HTTP status carried by the error, when the API produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api(err) => Some(err.status),
			_ => None,
		}
	}

	/// Returns `true` when the API kept answering `429 Too Many Requests`.
	pub fn is_rate_limited(&self) -> bool {
		self.status() == Some(429)
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP transport could not be constructed.
	#[error("HTTP transport could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// Base URL is missing from the environment.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than HTTP(S).
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending URL.
		url: String,
	},
	/// Base URL carries a query string or fragment.
	#[error("Base URL must not carry a query or fragment: {url}.")]
	BaseUrlHasQuery {
		/// Offending URL.
		url: String,
	},
	/// Endpoint could not be joined with the base URL.
	#[error("Endpoint `{endpoint}` cannot be joined with the base URL.")]
	InvalidEndpoint {
		/// Endpoint path supplied by the caller.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Encode {
		/// Underlying serialization failure.
		#[source]
		source: Arc<serde_json::Error>,
	},
	/// Identifier validation failed.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Session builder validation failed.
	#[error("Unable to build session.")]
	SessionBuild(#[from] crate::auth::SessionBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
impl From<serde_json::Error> for ConfigError {
	fn from(e: serde_json::Error) -> Self {
		Self::Encode { source: Arc::new(e) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Error status returned by the storefront API.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct ApiError {
	/// HTTP status code.
	pub status: u16,
	/// Server-supplied message, or a generic description of the status.
	pub message: String,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
}
impl ApiError {
	/// Builds an error from a status and optional reason phrase plus the raw response body.
	///
	/// JSON bodies contribute their `message` (or `error`) string; anything else falls back to
	/// `Request failed with status <code> <reason>`.
	pub fn from_body(status: u16, status_text: Option<&str>, body: &[u8]) -> Self {
		let message = server_message(body).unwrap_or_else(|| match status_text {
			Some(text) if !text.is_empty() => format!("Request failed with status {status} {text}"),
			_ => format!("Request failed with status {status}"),
		});

		Self { status, message, retry_after: None }
	}

	/// Attaches a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}
}

/// Transport-level failures (network, IO).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the storefront API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

fn server_message(body: &[u8]) -> Option<String> {
	let value = serde_json::from_slice::<serde_json::Value>(body).ok()?;
	let object = value.as_object()?;

	["message", "error"]
		.iter()
		.filter_map(|field| object.get(*field).and_then(serde_json::Value::as_str))
		.find(|text| !text.trim().is_empty())
		.map(str::to_owned)
}
