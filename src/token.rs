//! Access-token value object and its redacting secret wrapper.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping credential material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Immutable credential produced by a successful authorization-code exchange.
///
/// Both components default to absent when the provider omits them. The value
/// itself is never persisted; only its token string is written to storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken {
	token: Option<TokenSecret>,
	expires_in: Option<i64>,
}
impl AccessToken {
	/// Wraps the raw `access_token` / `expires_in` pair from a decoded exchange body.
	pub fn new(token: Option<String>, expires_in: Option<i64>) -> Self {
		Self { token: token.map(TokenSecret::new), expires_in }
	}

	/// Returns true when a usable token string is present.
	///
	/// Provider tokens are opaque non-empty strings; `"0"` counts as absent.
	pub fn has_token(&self) -> bool {
		matches!(&self.token, Some(secret) if !secret.expose().is_empty() && secret.expose() != "0")
	}

	/// Returns the token secret, if present.
	pub fn token(&self) -> Option<&TokenSecret> {
		self.token.as_ref()
	}

	/// Declared lifetime in seconds, if the provider reported one.
	pub fn expires_in(&self) -> Option<i64> {
		self.expires_in
	}

	/// Expiry instant relative to the provided issuance time, when a lifetime is known.
	pub fn expires_at(&self, issued_at: OffsetDateTime) -> Option<OffsetDateTime> {
		self.expires_in.map(|secs| issued_at + Duration::seconds(secs))
	}
}
