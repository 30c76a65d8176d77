//! Storefront request client with bearer-token injection, in-flight de-duplication, and bounded
//! retries.
//!
//! [`ApiClient`] owns its in-flight registry, so two clients never share de-duplicated outcomes.
//! Every call first joins the registry under its `METHOD:endpoint` key: the first caller performs
//! the request while later identical callers wait for and receive the same outcome. The leader
//! retries `429` responses (honoring `Retry-After`) and network failures per [`RetryPolicy`], and
//! surfaces any other error status immediately.

mod inflight;
mod metrics;
mod retry;

pub use inflight::RequestKey;
pub use metrics::ClientMetrics;
pub use retry::*;

// self
use crate::{
	_prelude::*,
	client::inflight::{InFlight, Joined},
	config::ClientConfig,
	error::{ApiError, ConfigError},
	http::{ApiRequest, ApiResponse, ApiTransport, Method},
	obs::{self, Operation, OperationSpan, Outcome},
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// A single logical API call, possibly spanning several attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiCall {
	/// HTTP method.
	pub method: Method,
	/// Endpoint relative to the configured base URL, query string included.
	pub endpoint: String,
	/// JSON-encoded request body.
	pub body: Option<Vec<u8>>,
	/// Whether identical concurrent calls may share this call's outcome.
	pub dedupe: bool,
}
impl ApiCall {
	/// Creates a call without a body.
	pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
		Self { method, endpoint: endpoint.into(), body: None, dedupe: true }
	}

	/// `GET endpoint`.
	pub fn get(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Get, endpoint)
	}

	/// `POST endpoint`.
	pub fn post(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Post, endpoint)
	}

	/// `PUT endpoint`.
	pub fn put(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Put, endpoint)
	}

	/// `DELETE endpoint`.
	pub fn delete(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Delete, endpoint)
	}

	/// Serializes `body` as the JSON request body.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body)?);

		Ok(self)
	}

	/// Opts this call out of in-flight de-duplication.
	pub fn without_dedupe(mut self) -> Self {
		self.dedupe = false;

		self
	}

	/// Returns the de-duplication key for this call.
	pub fn key(&self) -> RequestKey {
		RequestKey::new(self.method, &self.endpoint)
	}
}

/// Storefront API client bound to one base URL, session store, and transport.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound attempt.
	pub transport: Arc<T>,
	/// Session source consulted for the bearer token before each attempt.
	pub sessions: Arc<dyn SessionStore>,
	/// Base URL and retry policy.
	pub config: ClientConfig,
	/// Shared request counters.
	pub metrics: Arc<ClientMetrics>,
	in_flight: InFlight,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		sessions: Arc<dyn SessionStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			sessions,
			config,
			metrics: Default::default(),
			in_flight: Default::default(),
		}
	}

	/// Number of distinct requests currently on the wire.
	pub fn in_flight_len(&self) -> usize {
		self.in_flight.len()
	}

	/// `GET endpoint`, decoding the JSON response into `R`.
	pub async fn get<R>(&self, endpoint: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send(ApiCall::get(endpoint)).await
	}

	/// `POST endpoint` with a JSON body, decoding the JSON response into `R`.
	pub async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send(ApiCall::post(endpoint).json(body)?).await
	}

	/// `PUT endpoint` with a JSON body, decoding the JSON response into `R`.
	pub async fn put<B, R>(&self, endpoint: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send(ApiCall::put(endpoint).json(body)?).await
	}

	/// `DELETE endpoint`, decoding the JSON response (or `null` for empty bodies) into `R`.
	pub async fn delete<R>(&self, endpoint: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send(ApiCall::delete(endpoint)).await
	}

	/// Sends `call` and decodes the successful response body into `R`.
	pub async fn send<R>(&self, call: ApiCall) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let endpoint = call.endpoint.clone();
		let response = self.send_raw(call).await?;

		decode(&endpoint, &response.body)
	}

	/// Sends `call` and returns the successful raw response.
	pub async fn send_raw(&self, call: ApiCall) -> Result<ApiResponse> {
		const OP: Operation = Operation::Request;

		let span = OperationSpan::new(OP, "send");

		obs::record_outcome(OP, Outcome::Attempt);

		let result = span
			.instrument(async {
				if !call.dedupe {
					return self.dispatch(&call).await;
				}

				match self.in_flight.join(&call.key()) {
					Joined::Leader(entry) =>
						entry.outcome().get_or_init(|| self.dispatch(&call)).await.clone(),
					Joined::Follower(entry) => {
						self.metrics.record_shared();
						obs::record_outcome(OP, Outcome::Shared);

						entry.outcome().get_or_init(|| self.dispatch(&call)).await.clone()
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_outcome(OP, Outcome::Success),
			Err(_) => {
				self.metrics.record_failure();
				obs::record_outcome(OP, Outcome::Failure);
			},
		}

		result
	}

	async fn dispatch(&self, call: &ApiCall) -> Result<ApiResponse> {
		const OP: Operation = Operation::Request;

		let url = self.config.endpoint_url(&call.endpoint)?;
		let policy = self.config.retry;
		let mut retries = 0;

		loop {
			let bearer = self.sessions.active().await?.map(|session| session.access_token);
			let request =
				ApiRequest { method: call.method, url: url.clone(), body: call.body.clone(), bearer };

			self.metrics.record_request();

			let (failure, error) = match self.transport.execute(request).await {
				Ok(response) if response.is_success() => return Ok(response),
				Ok(response) if response.is_rate_limited() => (
					RetryableFailure::RateLimited { retry_after: response.retry_after },
					Error::from(rejection(&response)),
				),
				Ok(response) => return Err(rejection(&response).into()),
				Err(err) => (RetryableFailure::Network, Error::from(err)),
			};

			match policy.decide(retries, &failure) {
				RetryDecision::Retry { delay } => {
					retries += 1;

					self.metrics.record_retry();
					obs::record_outcome(OP, Outcome::Retry);
					obs::warn_retry(OP, &call.key().to_string(), retries, delay, failure.as_str());

					tokio::time::sleep(delay).await;
				},
				RetryDecision::GiveUp => return Err(error),
			}
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a new client backed by a cookie-enabled reqwest transport.
	pub fn new(config: ClientConfig, sessions: Arc<dyn SessionStore>) -> Result<Self> {
		Ok(Self::with_transport(config, sessions, ReqwestTransport::new()?))
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			sessions: self.sessions.clone(),
			config: self.config.clone(),
			metrics: self.metrics.clone(),
			in_flight: self.in_flight.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("retry", &self.config.retry)
			.field("in_flight", &self.in_flight_len())
			.finish()
	}
}

fn rejection(response: &ApiResponse) -> ApiError {
	ApiError::from_body(response.status, response.status_text.as_deref(), &response.body)
		.with_retry_after(response.retry_after)
}

/// Decodes a JSON body, treating an empty body as `null`.
pub(crate) fn decode<R>(endpoint: &str, body: &[u8]) -> Result<R>
where
	R: DeserializeOwned,
{
	let body = if body.iter().all(u8::is_ascii_whitespace) { b"null".as_slice() } else { body };
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Decode { endpoint: endpoint.to_owned(), source: Arc::new(source) })
}
