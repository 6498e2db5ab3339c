//! Reddit OAuth 2.0 authorization-code authenticator - CSRF-protected login URLs,
//! code-for-token exchanges, and session-scoped credential storage in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod authenticator;
pub mod error;
pub mod http;
pub mod obs;
pub mod storage;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		authenticator::Authenticator,
		http::ReqwestRequestManager,
		storage::{AuthStorage, MemoryStorage},
	};

	/// Constructs an [`Authenticator`] backed by an in-memory storage and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_authenticator(
		client_id: &str,
		client_secret: &str,
	) -> (Authenticator, Arc<MemoryStorage>) {
		let storage_backend = Arc::new(MemoryStorage::default());
		let storage: Arc<dyn AuthStorage> = storage_backend.clone();
		let request_manager = Arc::new(ReqwestRequestManager::default());
		let authenticator =
			Authenticator::new(request_manager, client_id, client_secret).with_storage(storage);

		(authenticator, storage_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
#[cfg(test)] use reddit_oauth as _;
