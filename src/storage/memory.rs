//! Thread-safe in-memory [`AuthStorage`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	storage::{self, AuthStorage, StorageError},
};

type SessionMap = Arc<RwLock<HashMap<String, String>>>;

/// Keeps the session entries in-process; the default backend for new authenticators.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage(SessionMap);
impl AuthStorage for MemoryStorage {
	fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
		let key = storage::validate_key(key)?;

		self.0.write().insert(storage::storage_key_id(key), value.to_owned());

		Ok(())
	}

	fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
		let key = storage::validate_key(key)?;

		Ok(self.0.read().get(&storage::storage_key_id(key)).cloned())
	}

	fn clear(&self, key: &str) -> Result<(), StorageError> {
		let key = storage::validate_key(key)?;

		self.0.write().remove(&storage::storage_key_id(key));

		Ok(())
	}
}
