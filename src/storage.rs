//! Session-scoped storage contract and built-in backends for authentication state.
//!
//! A storage holds at most four string entries per user session: `state`,
//! `code`, `access_token`, and `redirect_uri`. Any other key is rejected
//! before backend I/O runs. Backends namespace the entries with a fixed
//! `reddit_` prefix so they never collide with unrelated session data; both
//! the key names and the prefix are part of the persisted-state contract.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

// self
use crate::_prelude::*;

/// The exact set of keys a storage accepts, in the order [`AuthStorage::clear_all`] visits them.
pub const VALID_KEYS: [&str; 4] = ["state", "code", "access_token", "redirect_uri"];

const STORAGE_KEY_PREFIX: &str = "reddit_";

/// Error type produced by [`AuthStorage`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StorageError {
	/// A key outside [`VALID_KEYS`] was requested; always a programming error.
	#[error(
		"Unsupported key `{key}` passed to the authentication storage. Valid keys are: state, code, access_token, redirect_uri."
	)]
	UnsupportedKey {
		/// The rejected key.
		key: String,
	},
	/// Serialization failure surfaced by the backend.
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

/// Validates a key against [`VALID_KEYS`] before any backend I/O.
pub fn validate_key(key: &str) -> Result<&'static str, StorageError> {
	VALID_KEYS
		.iter()
		.find(|valid| **valid == key)
		.copied()
		.ok_or_else(|| StorageError::UnsupportedKey { key: key.to_owned() })
}

/// Returns the namespaced identifier backends persist a key under.
pub fn storage_key_id(key: &str) -> String {
	format!("{STORAGE_KEY_PREFIX}{key}")
}

/// Storage backend contract scoped to a single user session.
///
/// Implementations validate every key with [`validate_key`] and operate
/// synchronously; the authenticator assumes no internal concurrency.
pub trait AuthStorage
where
	Self: Send + Sync,
{
	/// Persists or replaces the value stored under `key`.
	fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

	/// Fetches the value stored under `key`, if present.
	fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

	/// Removes the value stored under `key`, if present.
	fn clear(&self, key: &str) -> Result<(), StorageError>;

	/// Clears every recognized key and nothing else.
	fn clear_all(&self) -> Result<(), StorageError> {
		for key in VALID_KEYS {
			self.clear(key)?;
		}

		Ok(())
	}
}
