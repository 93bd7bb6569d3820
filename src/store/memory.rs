//! Thread-safe in-memory [`SessionStore`] for tests and short-lived hosts.

// self
use crate::{
	_prelude::*,
	auth::{Session, TokenSecret},
	store::{SessionStore, StoreFuture},
};

/// Keeps the session in-process; it disappears with the store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Session>>);
impl MemoryStore {
	/// Creates a store pre-populated with `session`.
	pub fn with_session(session: Session) -> Self {
		Self(Arc::new(RwLock::new(session)))
	}

	/// Returns a copy of the stored session without going through the async contract.
	pub fn snapshot(&self) -> Session {
		self.0.read().clone()
	}
}
impl SessionStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Session> {
		let session = self.snapshot();

		Box::pin(async move { Ok(session) })
	}

	fn save(&self, session: Session) -> StoreFuture<'_, ()> {
		*self.0.write() = session;

		Box::pin(async { Ok(()) })
	}

	fn replace_token(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		self.0.write().token = Some(token);

		Box::pin(async { Ok(()) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		*self.0.write() = Session::default();

		Box::pin(async { Ok(()) })
	}
}
