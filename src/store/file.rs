//! File-backed [`SessionStore`] standing in for durable client storage.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Session, TokenSecret},
	store::{SessionStore, StoreError, StoreFuture},
};

/// Persists the session to a JSON file (`auth_token` and `user` keys) after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Session>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Returns the backing file path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Session, StoreError> {
		if !path.exists() {
			return Ok(Session::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Session::default());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, session: &Session) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(session).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize session snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn mutate(&self, apply: impl FnOnce(&mut Session)) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let mut next = guard.clone();

		apply(&mut next);
		// Memory only changes once the snapshot is on disk.
		self.persist_locked(&next)?;

		*guard = next;

		Ok(())
	}
}
impl SessionStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Session> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn save(&self, session: Session) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|current| *current = session) })
	}

	fn replace_token(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|current| current.token = Some(token)) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.mutate(|current| *current = Session::default()) })
	}
}
