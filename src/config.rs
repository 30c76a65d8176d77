//! Client configuration: API base URL and retry policy.

// self
use crate::{_prelude::*, client::RetryPolicy, error::ConfigError};

/// Environment variable holding the storefront API base URL.
pub const BASE_URL_ENV: &str = "STOREFRONT_API_URL";

/// Validated configuration shared by every request a client issues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base URL that endpoints are appended to (e.g. `https://api.example.com/v1`).
	pub base_url: Url,
	/// Retry policy applied to rate-limited and failed requests.
	pub retry: RetryPolicy,
}
impl ClientConfig {
	/// Returns a builder seeded with the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Reads the base URL from [`BASE_URL_ENV`] and applies default retry settings.
	pub fn from_env() -> Result<Self, ConfigError> {
		let raw =
			std::env::var(BASE_URL_ENV).map_err(|_| ConfigError::MissingEnv { name: BASE_URL_ENV })?;

		Self::from_base_url(raw.trim())
	}

	/// Parses `raw` as the base URL and applies default retry settings.
	pub fn from_base_url(raw: &str) -> Result<Self, ConfigError> {
		let base_url =
			Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		Self::builder(base_url).build()
	}

	/// Joins an endpoint such as `/products?page=2` onto the base URL, keeping any base path.
	pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if endpoint.starts_with('/') {
			format!("{base}{endpoint}")
		} else {
			format!("{base}/{endpoint}")
		};

		Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: endpoint.to_owned(), source })
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	base_url: Url,
	retry: RetryPolicy,
}
impl ClientConfigBuilder {
	/// Creates a new builder with the default retry policy.
	pub fn new(base_url: Url) -> Self {
		Self { base_url, retry: RetryPolicy::default() }
	}

	/// Overrides the retry policy.
	pub fn retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		match self.base_url.scheme() {
			"http" | "https" => {},
			_ => return Err(ConfigError::UnsupportedScheme { url: self.base_url.to_string() }),
		}

		if self.base_url.query().is_some() || self.base_url.fragment().is_some() {
			return Err(ConfigError::BaseUrlHasQuery { url: self.base_url.to_string() });
		}

		Ok(ClientConfig { base_url: self.base_url, retry: self.retry })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse config fixture URL.")
	}

	#[test]
	fn builder_rejects_unsupported_bases() {
		let err = ClientConfig::builder(url("ftp://api.example.com"))
			.build()
			.expect_err("Non-HTTP schemes should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { .. }));

		let err = ClientConfig::builder(url("https://api.example.com/v1?debug=1"))
			.build()
			.expect_err("Base URLs with a query should be rejected.");

		assert!(matches!(err, ConfigError::BaseUrlHasQuery { .. }));
		assert!(matches!(
			ClientConfig::from_base_url("not a url"),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
	}

	#[test]
	fn endpoints_keep_the_base_path() {
		let config = ClientConfig::from_base_url("https://api.example.com/v1/")
			.expect("Base URL fixture should be valid.");

		assert_eq!(
			config.endpoint_url("/products?page=2").expect("Endpoint should join.").as_str(),
			"https://api.example.com/v1/products?page=2"
		);
		assert_eq!(
			config.endpoint_url("payments/ORD-1").expect("Endpoint should join.").as_str(),
			"https://api.example.com/v1/payments/ORD-1"
		);
		assert_eq!(config.retry, RetryPolicy::default());
	}
}
