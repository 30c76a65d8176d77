//! Thread-safe in-memory [`SessionStore`] scoped to the lifetime of one client.

// self
use crate::{
	_prelude::*,
	auth::Session,
	store::{SessionStore, StoreError, StoreFuture},
};

#[derive(Debug, Default)]
struct SessionState {
	session: Option<Session>,
	redirect: Option<String>,
}

/// Storage backend that keeps the session and redirect target in-process.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(Arc<RwLock<SessionState>>);
impl MemorySessionStore {
	/// Creates a store that already holds `session`.
	pub fn with_session(session: Session) -> Self {
		let store = Self::default();

		store.0.write().session = Some(session);

		store
	}

	/// Returns a snapshot of the stored session without going through the async contract.
	pub fn snapshot(&self) -> Option<Session> {
		self.0.read().session.clone()
	}
}
impl SessionStore for MemorySessionStore {
	fn load(&self) -> StoreFuture<'_, Option<Session>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.read().session.clone()) })
	}

	fn save(&self, session: Session) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			state.write().session = Some(session);

			Ok::<_, StoreError>(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, Option<Session>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.write().session.take()) })
	}

	fn remember_redirect(&self, path: String) -> StoreFuture<'_, ()> {
		let state = self.0.clone();

		Box::pin(async move {
			state.write().redirect = Some(path);

			Ok(())
		})
	}

	fn take_redirect(&self) -> StoreFuture<'_, Option<String>> {
		let state = self.0.clone();

		Box::pin(async move { Ok(state.write().redirect.take()) })
	}
}
