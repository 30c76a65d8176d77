//! Session storage contracts and the built-in in-memory implementation.
//!
//! The auth provider owns the session lifecycle; stores only expose the current snapshot to the
//! request client and route guard, plus the post-login redirect target remembered by the guard.

pub mod memory;

pub use memory::MemorySessionStore;

// self
use crate::{_prelude::*, auth::Session};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by session stores.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the stored session, if any, without checking its expiry.
	fn load(&self) -> StoreFuture<'_, Option<Session>>;

	/// Persists or replaces the current session.
	fn save(&self, session: Session) -> StoreFuture<'_, ()>;

	/// Removes the current session, returning the previous value.
	fn clear(&self) -> StoreFuture<'_, Option<Session>>;

	/// Remembers the path a signed-out visitor was heading to.
	fn remember_redirect(&self, path: String) -> StoreFuture<'_, ()>;

	/// Returns and forgets the remembered post-login path.
	fn take_redirect(&self) -> StoreFuture<'_, Option<String>>;
}
impl dyn SessionStore + '_ {
	/// Returns the stored session only while its access token is still valid at `now`.
	pub async fn active_at(&self, now: OffsetDateTime) -> Result<Option<Session>, StoreError> {
		Ok(self.load().await?.filter(|session| !session.is_expired_at(now)))
	}

	/// Returns the stored session only while its access token is still valid.
	pub async fn active(&self) -> Result<Option<Session>, StoreError> {
		self.active_at(OffsetDateTime::now_utc()).await
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "keyring locked".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("keyring locked"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
