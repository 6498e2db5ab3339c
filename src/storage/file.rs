//! Simple file-backed [`AuthStorage`] for lightweight deployments and bots.
//!
//! Stands in for a process-session store: the credential survives restarts of
//! the owning process. One file maps to one user session.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	storage::{self, AuthStorage, StorageError},
};

/// Persists the session entries to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStorage {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<String, String>>>,
}
impl FileStorage {
	/// Opens (or creates) a storage at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { HashMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<String, String>, StorageError> {
		let metadata = path.metadata().map_err(|e| StorageError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StorageError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StorageError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StorageError::Backend {
				message: format!("Failed to create storage directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<String, String>) -> Result<(), StorageError> {
		Self::ensure_parent_exists(&self.path)?;

		// Deterministic snapshots keep the file diff-friendly.
		let snapshot: BTreeMap<_, _> = contents.iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StorageError::Serialization {
				message: format!("Failed to serialize storage snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StorageError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StorageError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StorageError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl AuthStorage for FileStorage {
	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		let key = storage::validate_key(key)?;
		let mut guard = self.inner.write();

		guard.insert(storage::storage_key_id(key), value.to_owned());
		self.persist_locked(&guard)
	}

	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		let key = storage::validate_key(key)?;

		Ok(self.inner.read().get(&storage::storage_key_id(key)).cloned())
	}

	fn clear(&self, key: &str) -> Result<(), StorageError> {
		let key = storage::validate_key(key)?;
		let mut guard = self.inner.write();

		if guard.remove(&storage::storage_key_id(key)).is_some() {
			self.persist_locked(&guard)?;
		}

		Ok(())
	}
}
