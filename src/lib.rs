//! Storefront API client toolkit: de-duplicated, retrying requests against the storefront backend,
//! payment status polling with a decaying schedule, and role-based route guards.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod obs;
pub mod poller;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{ApiClient, RetryPolicy},
		config::ClientConfig,
		http::ReqwestTransport,
		store::{MemorySessionStore, SessionStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestTransport>;

	/// Retry policy with millisecond delays so reqwest-backed tests stay fast.
	pub fn fast_retry_policy() -> RetryPolicy {
		RetryPolicy::default()
			.with_rate_limit_fallback(StdDuration::from_millis(10))
			.with_network_delay(StdDuration::from_millis(10))
	}

	/// Constructs an [`ApiClient`] backed by an in-memory session store and the reqwest transport,
	/// pointed at `base_url` (typically an `httpmock` server).
	pub fn build_reqwest_test_client(base_url: &str) -> (ReqwestTestClient, Arc<MemorySessionStore>) {
		let sessions_backend = Arc::new(MemorySessionStore::default());
		let sessions: Arc<dyn SessionStore> = sessions_backend.clone();
		let config = ClientConfig::builder(
			Url::parse(base_url).expect("Test base URL should parse successfully."),
		)
		.retry(fast_retry_policy())
		.build()
		.expect("Test client configuration should be valid.");
		let transport = ReqwestTransport::new().expect("Failed to build Reqwest transport for tests.");
		let client = ApiClient::with_transport(config, sessions, transport);

		(client, sessions_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::OnceCell;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
