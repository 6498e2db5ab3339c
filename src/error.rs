//! Authenticator-level error types shared across the login and exchange paths.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical authenticator error exposed by public APIs.
///
/// Nothing in this crate retries automatically; every variant surfaces
/// synchronously to the immediate caller.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::storage::StorageError,
	),
	/// CSRF state validation failure while handling a redirect callback.
	#[error(transparent)]
	Csrf(#[from] CsrfError),
	/// Authorization-code exchange failure.
	#[error(transparent)]
	Exchange(#[from] ExchangeError),
}

/// CSRF validation failures raised while extracting the callback code.
///
/// Callers must treat every variant as "reject this login attempt"; none of
/// them is recoverable by retrying the same request.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CsrfError {
	/// No CSRF state is stored for this session.
	#[error("Could not find a stored CSRF state token.")]
	MissingStoredState,
	/// The inbound request carries a code but no state parameter.
	#[error("Could not find a CSRF state token in the request.")]
	MissingRequestState,
	/// The inbound state does not match the stored one.
	#[error("The CSRF state token from the request does not match the stored token.")]
	StateMismatch,
}

/// Failures raised while exchanging an authorization code for an access token.
///
/// Any variant propagating out of `fetch_new_access_token` wipes the session
/// storage first, so a stale or poisoned login attempt cannot be reused.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// No code was supplied to the exchange.
	#[error("Could not get access token: the code was empty.")]
	EmptyCode,
	/// Transport failed during the exchange.
	#[error("Could not get access token: the user may have revoked the authorization.")]
	Revoked {
		/// Transfer failure reported by the request manager.
		#[source]
		source: TransferError,
	},
	/// The provider returned an empty body.
	#[error("Could not get access token: the response from the provider was empty.")]
	EmptyResponse,
	/// The provider returned a body that could not be decoded.
	#[error("Could not get access token: the response from the provider was malformed.")]
	MalformedResponse(#[from] crate::http::ConvertError),
	/// The decoded body carries no usable token.
	#[error("Could not get access token: the response from the provider did not contain a token.")]
	MissingToken,
}

/// Transport-level failures raised by request manager implementations.
///
/// Never surfaced unwrapped by the authenticator; the exchange boundary
/// re-wraps it as [`ExchangeError::Revoked`] with the original attached.
#[derive(Debug, ThisError)]
pub enum TransferError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransferError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransferError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
