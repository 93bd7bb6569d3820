//! Session persistence contracts and built-in store implementations.
//!
//! The transport reads the session on every call and clears it on authorization failures;
//! the account flows write it after login and token refresh. Nothing else touches it.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Session, TokenSecret},
};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for the current session.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the current session; an empty session when nothing is stored.
	fn load(&self) -> StoreFuture<'_, Session>;

	/// Persists or replaces the whole session.
	fn save(&self, session: Session) -> StoreFuture<'_, ()>;

	/// Replaces the token while keeping the stored user profile.
	fn replace_token(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Removes both the token and the user profile.
	fn clear(&self) -> StoreFuture<'_, ()>;
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
