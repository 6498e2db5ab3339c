//! Transport primitives and collaborator contracts for provider requests.
//!
//! The module exposes [`RequestManager`] (one HTTP request/response cycle),
//! [`UrlGenerator`] (provider URL construction), and [`ResponseConverter`]
//! (body decoding) so downstream applications can integrate custom HTTP
//! stacks. The authenticator core depends only on these contracts, never on a
//! concrete client.

pub mod convert;
pub mod url;

pub use convert::*;
pub use url::*;

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransferError};

/// Boxed future returned by [`RequestManager`] implementations.
pub type RequestFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RawResponse, TransferError>> + 'a + Send>>;

/// Raw provider response captured before any decoding.
///
/// Non-2xx statuses are not transport failures; the decode step decides
/// whether a response counts as success.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}

/// Performs one HTTP request/response cycle against the provider.
///
/// Implementations raise [`TransferError`] only for transport-level problems
/// (connection, timeout, unparseable framing). Cancellation and timeout
/// policy live here; the authenticator imposes no timeout of its own and
/// never retries.
pub trait RequestManager
where
	Self: Send + Sync,
{
	/// Sends a single request, returning the raw response.
	fn send_request<'a>(
		&'a self,
		method: &'a str,
		uri: &'a str,
		headers: &'a [(&'a str, &'a str)],
		body: Option<String>,
	) -> RequestFuture<'a>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI. Configure
/// any custom [`ReqwestClient`] to disable redirect following before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestRequestManager(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestRequestManager {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestRequestManager {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestRequestManager {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl RequestManager for ReqwestRequestManager {
	fn send_request<'a>(
		&'a self,
		method: &'a str,
		uri: &'a str,
		headers: &'a [(&'a str, &'a str)],
		body: Option<String>,
	) -> RequestFuture<'a> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = reqwest::Method::from_bytes(method.as_bytes())
				.map_err(TransferError::network)?;
			let mut request = client.request(method, uri);

			for (name, value) in headers {
				request = request.header(*name, *value);
			}
			if let Some(body) = body {
				request = request.body(body);
			}

			let response = request.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(RawResponse { status, body })
		})
	}
}
