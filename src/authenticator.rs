//! The authentication state machine: CSRF-protected login URLs, callback
//! validation, and the authorization-code-for-token exchange.
//!
//! One login attempt moves the session storage through `state issued →
//! redirect_uri persisted → code validated (state cleared) → code +
//! access_token persisted`. A failed exchange wipes every entry so a
//! poisoned attempt cannot be resumed; an explicit [`Authenticator::clear_storage`]
//! does the same for "log out".

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	error::{CsrfError, ExchangeError},
	http::{DomainAlias, QueryParams, RequestManager, ResponseConverter, UrlGenerator},
	obs::{FlowKind, FlowOutcome, FlowSpan, record_flow_outcome},
	storage::{AuthStorage, MemoryStorage},
	token::AccessToken,
};

const AUTHORIZE_PATH: &str = "v1/authorize";
const ACCESS_TOKEN_PATH: &str = "v1/accessToken";
const STATE_LEN: usize = 32;

/// Read-only lookup over the inbound redirect request's query parameters.
///
/// The caller extracts these from whatever HTTP framework served the
/// redirect; the authenticator never reads ambient process state.
#[derive(Clone, Debug, Default)]
pub struct CallbackParams(BTreeMap<String, String>);
impl CallbackParams {
	/// Creates an empty parameter set (a page load without a redirect callback).
	pub fn new() -> Self {
		Self::default()
	}

	/// Collects parameters from key/value pairs.
	pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self(pairs.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}

	/// Collects the query parameters of a redirect URL.
	pub fn from_url(url: &Url) -> Self {
		Self(url.query_pairs().into_owned().collect())
	}

	/// Returns the parameter value, if present.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}
}

/// Scope shapes accepted by [`LoginOptions`].
#[derive(Clone, Debug)]
pub enum ScopeParam {
	/// Ordered scope list, joined with single spaces.
	List(Vec<String>),
	/// Pre-joined scope string; commas are normalized to spaces.
	Raw(String),
}
impl ScopeParam {
	fn normalized(&self) -> String {
		match self {
			ScopeParam::List(scopes) => scopes.join(" "),
			ScopeParam::Raw(raw) => raw.replace(',', " "),
		}
	}
}

/// Caller-supplied options for [`Authenticator::login_url`].
///
/// Values here win over the authenticator defaults on key collision.
#[derive(Clone, Debug, Default)]
pub struct LoginOptions {
	/// Redirect URI the provider sends the user back to; persisted for the exchange.
	pub redirect_uri: Option<String>,
	/// Requested scopes.
	pub scope: Option<ScopeParam>,
	/// Additional query parameters, overriding defaults on collision.
	pub extra: BTreeMap<String, String>,
}
impl LoginOptions {
	/// Sets the redirect URI.
	pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(uri.into());

		self
	}

	/// Sets the requested scopes.
	pub fn with_scope(mut self, scope: ScopeParam) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Adds an extra query parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.insert(key.into(), value.into());

		self
	}
}

/// Orchestrates the authorization-code login against the provider.
///
/// The authenticator owns the client credentials, a swappable session
/// [`AuthStorage`], and the [`RequestManager`] used for the token exchange.
/// All operations execute synchronously to completion within one call; the
/// crate provides no mutual exclusion across concurrent requests sharing a
/// session.
pub struct Authenticator {
	client_id: String,
	client_secret: String,
	storage: Arc<dyn AuthStorage>,
	request_manager: Arc<dyn RequestManager>,
}
impl Authenticator {
	/// Creates an authenticator with an in-memory session storage.
	///
	/// Use [`Authenticator::with_storage`] or [`Authenticator::set_storage`] to
	/// attach a persistent backend.
	pub fn new(
		request_manager: Arc<dyn RequestManager>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			storage: Arc::new(MemoryStorage::default()),
			request_manager,
		}
	}

	/// Replaces the storage backend at construction time.
	pub fn with_storage(mut self, storage: Arc<dyn AuthStorage>) -> Self {
		self.storage = storage;

		self
	}

	/// Swaps the persistence backend at runtime.
	pub fn set_storage(&mut self, storage: Arc<dyn AuthStorage>) {
		self.storage = storage;
	}

	/// Returns the active storage backend.
	pub fn storage(&self) -> &Arc<dyn AuthStorage> {
		&self.storage
	}

	/// Builds the provider login URL for a new (or resumed) login attempt.
	///
	/// Ensures a CSRF state exists, persists the resolved redirect URI for the
	/// later exchange, and delegates URL construction to the generator. No
	/// network I/O happens here.
	pub fn login_url(
		&self,
		url_generator: &dyn UrlGenerator,
		options: &LoginOptions,
	) -> Result<String> {
		let _guard = FlowSpan::new(FlowKind::Authorize, "login_url").entered();

		record_flow_outcome(FlowKind::Authorize, FlowOutcome::Attempt);

		let result = self.build_login_url(url_generator, options);
		let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

		record_flow_outcome(FlowKind::Authorize, outcome);

		result
	}

	fn build_login_url(
		&self,
		url_generator: &dyn UrlGenerator,
		options: &LoginOptions,
	) -> Result<String> {
		self.establish_csrf_state()?;

		let mut params = QueryParams::new();

		params.insert("response_type".into(), Some("code".into()));
		params.insert("client_id".into(), Some(self.client_id.clone()));
		params.insert("state".into(), self.storage.get("state")?);
		params.insert("redirect_uri".into(), options.redirect_uri.clone());

		for (key, value) in &options.extra {
			params.insert(key.clone(), Some(value.clone()));
		}

		// The provider rejects the exchange unless this exact URI comes back,
		// so the resolved value must survive until the callback returns.
		match params.get("redirect_uri").cloned().flatten() {
			Some(uri) => self.storage.set("redirect_uri", &uri)?,
			None => self.storage.clear("redirect_uri")?,
		}

		if let Some(scope) = &options.scope {
			params.insert("scope".into(), Some(scope.normalized()));
		}

		Ok(url_generator.url(DomainAlias::Www, AUTHORIZE_PATH, &params))
	}

	/// Lays down a CSRF state token for the pending login attempt.
	///
	/// Idempotent: once a non-empty state is stored it is never overwritten
	/// until a successful validation clears it.
	pub fn establish_csrf_state(&self) -> Result<()> {
		match self.storage.get("state")? {
			Some(state) if !state.is_empty() => Ok(()),
			_ => {
				let state = random_state(STATE_LEN);

				self.storage.set("state", &state)?;

				Ok(())
			},
		}
	}

	/// Extracts the authorization code from the inbound request, if any.
	///
	/// Returns `None` both when no code is present and when the code has
	/// already been validated by a prior call; CSRF failures are genuine
	/// errors. A successful validation consumes the stored state.
	fn callback_code(&self, request: &CallbackParams) -> Result<Option<String>> {
		let Some(code) = request.get("code") else {
			return Ok(None);
		};

		if self.storage.get("code")?.as_deref() == Some(code) {
			// Already validated and exchanged; a page reload must not re-run
			// the CSRF checks against the consumed state.
			return Ok(None);
		}

		let Some(stored_state) = self.storage.get("state")? else {
			return Err(CsrfError::MissingStoredState.into());
		};
		let Some(request_state) = request.get("state") else {
			return Err(CsrfError::MissingRequestState.into());
		};

		if stored_state != request_state {
			return Err(CsrfError::StateMismatch.into());
		}

		// The state is single use.
		self.storage.clear("state")?;

		Ok(Some(code.to_owned()))
	}

	/// Exchanges the callback's authorization code for an access token.
	///
	/// Without a fresh code this falls back to whatever token is cached in
	/// storage. A successful exchange persists both the code and the token; a
	/// failed one wipes every session entry before the error propagates.
	pub async fn fetch_new_access_token(
		&self,
		url_generator: &dyn UrlGenerator,
		request: &CallbackParams,
	) -> Result<Option<AccessToken>> {
		let span = FlowSpan::new(FlowKind::Exchange, "fetch_new_access_token");

		record_flow_outcome(FlowKind::Exchange, FlowOutcome::Attempt);

		let result = span.instrument(self.fetch_inner(url_generator, request)).await;
		let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

		record_flow_outcome(FlowKind::Exchange, outcome);

		result
	}

	async fn fetch_inner(
		&self,
		url_generator: &dyn UrlGenerator,
		request: &CallbackParams,
	) -> Result<Option<AccessToken>> {
		let Some(code) = self.callback_code(request)? else {
			// Nothing explicit in the request shadows the persisted credential.
			return Ok(self
				.storage
				.get("access_token")?
				.map(|token| AccessToken::new(Some(token), None)));
		};
		let token = match self.access_token_from_code(url_generator, &code).await {
			Ok(token) => token,
			Err(e) => {
				// The code was bogus, so everything based on it is invalid.
				self.storage.clear_all()?;

				return Err(e);
			},
		};

		self.storage.set("code", &code)?;

		if let Some(secret) = token.token() {
			self.storage.set("access_token", secret.expose())?;
		}

		Ok(Some(token))
	}

	/// Trades an authorization code for an access token at the provider.
	///
	/// Single attempt, no retries; retry policy belongs to the request
	/// manager or the caller.
	pub async fn access_token_from_code(
		&self,
		url_generator: &dyn UrlGenerator,
		code: &str,
	) -> Result<AccessToken> {
		if code.is_empty() {
			return Err(ExchangeError::EmptyCode.into());
		}

		let redirect_uri = self.storage.get("redirect_uri")?;
		let uri = url_generator.url(DomainAlias::Www, ACCESS_TOKEN_PATH, &QueryParams::new());
		let body =
			exchange_body(code, redirect_uri.as_deref(), &self.client_id, &self.client_secret);
		let headers = [("Content-Type", "application/x-www-form-urlencoded")];
		let response = self
			.request_manager
			.send_request("POST", &uri, &headers, Some(body))
			.await
			// Most likely the user very recently revoked the authorization.
			.map_err(|source| ExchangeError::Revoked { source })?;
		let Some(fields) = ResponseConverter::to_map(&response).map_err(ExchangeError::from)?
		else {
			return Err(ExchangeError::EmptyResponse.into());
		};
		let token = AccessToken::new(
			fields.get("access_token").and_then(|value| value.as_str()).map(str::to_owned),
			fields.get("expires_in").and_then(serde_json::Value::as_i64),
		);

		if !token.has_token() {
			return Err(ExchangeError::MissingToken.into());
		}

		Ok(token)
	}

	/// Clears every session entry; used by the caller to implement "log out".
	pub fn clear_storage(&self) -> Result<()> {
		self.storage.clear_all()?;

		Ok(())
	}
}
impl Debug for Authenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.finish()
	}
}

fn exchange_body(
	code: &str,
	redirect_uri: Option<&str>,
	client_id: &str,
	client_secret: &str,
) -> String {
	let mut serializer = url::form_urlencoded::Serializer::new(String::new());

	serializer.append_pair("grant_type", "authorization_code");
	serializer.append_pair("code", code);

	if let Some(redirect_uri) = redirect_uri {
		serializer.append_pair("redirect_uri", redirect_uri);
	}

	serializer.append_pair("client_id", client_id);
	serializer.append_pair("client_secret", client_secret);

	serializer.finish()
}

fn random_state(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		error::TransferError,
		http::{RawResponse, RequestFuture},
	};

	const APP_ID: &str = "123456789";
	const APP_SECRET: &str = "987654321";

	#[derive(Default)]
	struct StubRequestManager {
		reply: Mutex<Option<Result<RawResponse, TransferError>>>,
		requests: Mutex<Vec<(String, String, Option<String>)>>,
	}
	impl StubRequestManager {
		fn replying(reply: Result<RawResponse, TransferError>) -> Arc<Self> {
			Arc::new(Self { reply: Mutex::new(Some(reply)), requests: Default::default() })
		}

		fn json(body: &str) -> Arc<Self> {
			Self::replying(Ok(RawResponse { status: 200, body: body.as_bytes().to_vec() }))
		}

		fn request_count(&self) -> usize {
			self.requests.lock().len()
		}

		fn last_body(&self) -> Option<String> {
			self.requests.lock().last().and_then(|(_, _, body)| body.clone())
		}
	}
	impl RequestManager for StubRequestManager {
		fn send_request<'a>(
			&'a self,
			method: &'a str,
			uri: &'a str,
			_headers: &'a [(&'a str, &'a str)],
			body: Option<String>,
		) -> RequestFuture<'a> {
			self.requests.lock().push((method.to_owned(), uri.to_owned(), body));

			let reply = self.reply.lock().take();

			Box::pin(async move {
				reply.expect("Stub request manager should be called at most once.")
			})
		}
	}

	#[derive(Default)]
	struct RecordingUrlGenerator {
		calls: Mutex<Vec<(DomainAlias, String, QueryParams)>>,
	}
	impl RecordingUrlGenerator {
		fn last_params(&self) -> QueryParams {
			self.calls
				.lock()
				.last()
				.map(|(_, _, params)| params.clone())
				.expect("URL generator should have been called.")
		}
	}
	impl UrlGenerator for RecordingUrlGenerator {
		fn url(&self, alias: DomainAlias, path: &str, params: &QueryParams) -> String {
			self.calls.lock().push((alias, path.to_owned(), params.clone()));

			"loginUrl".into()
		}
	}

	fn build_authenticator(manager: Arc<StubRequestManager>) -> Authenticator {
		Authenticator::new(manager, APP_ID, APP_SECRET)
	}

	fn some(value: &str) -> Option<String> {
		Some(value.to_owned())
	}

	#[test]
	fn login_url_merges_defaults_with_stored_state() {
		let auth = build_authenticator(Arc::default());

		auth.storage().set("state", "random").expect("State fixture should persist.");

		let generator = RecordingUrlGenerator::default();
		let url = auth
			.login_url(&generator, &LoginOptions::default())
			.expect("Login URL should build.");

		assert_eq!(url, "loginUrl");

		let (alias, path, params) = generator
			.calls
			.lock()
			.last()
			.cloned()
			.expect("URL generator should have been called.");

		assert_eq!(alias, DomainAlias::Www);
		assert_eq!(path, "v1/authorize");
		assert_eq!(params.get("response_type"), Some(&some("code")));
		assert_eq!(params.get("client_id"), Some(&some(APP_ID)));
		assert_eq!(params.get("state"), Some(&some("random")));
		assert_eq!(params.get("redirect_uri"), Some(&None));
		assert!(!params.contains_key("scope"));
	}

	#[test]
	fn login_url_joins_scope_lists_with_spaces() {
		let auth = build_authenticator(Arc::default());
		let generator = RecordingUrlGenerator::default();
		let options = LoginOptions::default().with_scope(ScopeParam::List(vec![
			"foo".into(),
			"bar".into(),
			"baz".into(),
		]));

		auth.login_url(&generator, &options).expect("Login URL should build.");

		assert_eq!(generator.last_params().get("scope"), Some(&some("foo bar baz")));
	}

	#[test]
	fn login_url_normalizes_comma_separated_scopes() {
		let auth = build_authenticator(Arc::default());
		let generator = RecordingUrlGenerator::default();
		let options = LoginOptions::default().with_scope(ScopeParam::Raw("foo,bar,baz".into()));

		auth.login_url(&generator, &options).expect("Login URL should build.");

		assert_eq!(generator.last_params().get("scope"), Some(&some("foo bar baz")));
	}

	#[test]
	fn login_url_persists_the_resolved_redirect_uri() {
		let auth = build_authenticator(Arc::default());
		let generator = RecordingUrlGenerator::default();
		let options = LoginOptions::default().with_redirect_uri("https://app.example.com/cb");

		auth.login_url(&generator, &options).expect("Login URL should build.");

		assert_eq!(
			auth.storage().get("redirect_uri").expect("Redirect URI should be readable."),
			some("https://app.example.com/cb"),
		);

		// A new attempt without a redirect URI clears the stale one.
		auth.login_url(&generator, &LoginOptions::default())
			.expect("Login URL should build again.");

		assert_eq!(
			auth.storage().get("redirect_uri").expect("Redirect URI should be readable."),
			None
		);
	}

	#[test]
	fn login_url_lets_extra_params_override_defaults() {
		let auth = build_authenticator(Arc::default());
		let generator = RecordingUrlGenerator::default();
		let options = LoginOptions::default().with_param("response_type", "token");

		auth.login_url(&generator, &options).expect("Login URL should build.");

		assert_eq!(generator.last_params().get("response_type"), Some(&some("token")));
	}

	#[test]
	fn csrf_state_is_established_exactly_once() {
		let auth = build_authenticator(Arc::default());

		auth.establish_csrf_state().expect("First establish call should write a state.");

		let first = auth
			.storage()
			.get("state")
			.expect("State should be readable.")
			.expect("State should be present after establish.");

		assert_eq!(first.len(), STATE_LEN);

		auth.establish_csrf_state().expect("Second establish call should be a no-op.");

		let second = auth
			.storage()
			.get("state")
			.expect("State should be readable.")
			.expect("State should still be present.");

		assert_eq!(first, second, "Establishing twice must not rotate the state.");
	}

	#[test]
	fn callback_code_without_code_is_absent_and_mutates_nothing() {
		let auth = build_authenticator(Arc::default());

		auth.storage().set("state", "bazbar").expect("State fixture should persist.");

		let code = auth
			.callback_code(&CallbackParams::new())
			.expect("A request without a code is not an error.");

		assert_eq!(code, None);
		assert_eq!(
			auth.storage().get("state").expect("State should be readable."),
			some("bazbar"),
			"A codeless request must not consume the stored state.",
		);
	}

	#[test]
	fn callback_code_skips_an_already_validated_code() {
		let auth = build_authenticator(Arc::default());

		auth.storage().set("code", "foobar").expect("Code fixture should persist.");

		let request = CallbackParams::from_pairs([("code", "foobar")]);
		let code = auth
			.callback_code(&request)
			.expect("A replayed code is deduplicated, not rejected.");

		assert_eq!(code, None);
	}

	#[test]
	fn callback_code_requires_a_stored_state() {
		let auth = build_authenticator(Arc::default());
		let request = CallbackParams::from_pairs([("code", "foobar"), ("state", "bazbar")]);
		let err = auth.callback_code(&request).expect_err("A missing stored state must fail.");

		assert!(matches!(err, Error::Csrf(CsrfError::MissingStoredState)));
	}

	#[test]
	fn callback_code_requires_a_request_state() {
		let auth = build_authenticator(Arc::default());

		auth.storage().set("state", "bazbar").expect("State fixture should persist.");

		let request = CallbackParams::from_pairs([("code", "foobar")]);
		let err = auth.callback_code(&request).expect_err("A missing request state must fail.");

		assert!(matches!(err, Error::Csrf(CsrfError::MissingRequestState)));
	}

	#[test]
	fn callback_code_rejects_a_mismatched_state() {
		let auth = build_authenticator(Arc::default());

		auth.storage().set("state", "bazbar").expect("State fixture should persist.");

		let request = CallbackParams::from_pairs([("code", "foobar"), ("state", "invalid")]);
		let err = auth.callback_code(&request).expect_err("A mismatched state must fail.");

		assert!(matches!(err, Error::Csrf(CsrfError::StateMismatch)));
	}

	#[test]
	fn callback_code_consumes_the_state_on_match() {
		let auth = build_authenticator(Arc::default());

		auth.storage().set("state", "bazbar").expect("State fixture should persist.");

		let request = CallbackParams::from_pairs([("code", "foobar"), ("state", "bazbar")]);
		let code = auth.callback_code(&request).expect("A matching state must validate.");

		assert_eq!(code, some("foobar"));
		assert_eq!(
			auth.storage().get("state").expect("State should be readable."),
			None,
			"The CSRF state is single use and must be cleared.",
		);
	}

	#[tokio::test]
	async fn fetch_falls_back_to_the_cached_token_without_a_code() {
		let auth = build_authenticator(Arc::default());
		let generator = RecordingUrlGenerator::default();

		auth.storage().set("access_token", "baz").expect("Token fixture should persist.");

		let token = auth
			.fetch_new_access_token(&generator, &CallbackParams::new())
			.await
			.expect("A codeless request should fall back to storage.")
			.expect("The cached token should be reported.");

		assert_eq!(token.token().map(AsRef::as_ref), Some("baz"));
	}

	#[tokio::test]
	async fn fetch_reports_absence_when_nothing_is_cached() {
		let auth = build_authenticator(Arc::default());
		let generator = RecordingUrlGenerator::default();
		let token = auth
			.fetch_new_access_token(&generator, &CallbackParams::new())
			.await
			.expect("A codeless request should fall back to storage.");

		assert!(token.is_none());
	}

	#[tokio::test]
	async fn fetch_persists_the_code_and_token_on_success() {
		let manager = StubRequestManager::json("{\"access_token\":\"at\",\"expires_in\":3600}");
		let auth = build_authenticator(manager.clone());
		let generator = RecordingUrlGenerator::default();

		auth.storage().set("state", "bazbar").expect("State fixture should persist.");

		let request = CallbackParams::from_pairs([("code", "newCode"), ("state", "bazbar")]);
		let token = auth
			.fetch_new_access_token(&generator, &request)
			.await
			.expect("The exchange should succeed.")
			.expect("A fresh token should be returned.");

		assert_eq!(token.token().map(AsRef::as_ref), Some("at"));
		assert_eq!(token.expires_in(), Some(3_600));
		assert_eq!(auth.storage().get("code").expect("Code should be readable."), some("newCode"));
		assert_eq!(
			auth.storage().get("access_token").expect("Token should be readable."),
			some("at")
		);
		assert_eq!(manager.request_count(), 1);
	}

	#[tokio::test]
	async fn fetch_wipes_the_storage_when_the_exchange_fails() {
		let manager = StubRequestManager::replying(Err(TransferError::Io(
			std::io::Error::other("connection reset"),
		)));
		let auth = build_authenticator(manager);
		let generator = RecordingUrlGenerator::default();

		auth.storage().set("state", "bazbar").expect("State fixture should persist.");
		auth.storage()
			.set("redirect_uri", "https://app.example.com/cb")
			.expect("Redirect fixture should persist.");
		auth.storage().set("access_token", "stale").expect("Token fixture should persist.");

		let request = CallbackParams::from_pairs([("code", "newCode"), ("state", "bazbar")]);
		let err = auth
			.fetch_new_access_token(&generator, &request)
			.await
			.expect_err("A transfer failure must propagate.");

		assert!(matches!(err, Error::Exchange(ExchangeError::Revoked { .. })));

		for key in crate::storage::VALID_KEYS {
			assert_eq!(
				auth.storage().get(key).expect("Storage should remain readable."),
				None,
				"A failed exchange must wipe `{key}`.",
			);
		}
	}

	#[tokio::test]
	async fn exchange_rejects_an_empty_code_before_any_network_call() {
		let manager = Arc::new(StubRequestManager::default());
		let auth = build_authenticator(manager.clone());
		let generator = RecordingUrlGenerator::default();
		let err = auth
			.access_token_from_code(&generator, "")
			.await
			.expect_err("An empty code must fail.");

		assert!(matches!(err, Error::Exchange(ExchangeError::EmptyCode)));
		assert_eq!(manager.request_count(), 0, "No request may be sent for an empty code.");
	}

	#[tokio::test]
	async fn exchange_echoes_the_stored_redirect_uri() {
		let manager = StubRequestManager::json("{\"access_token\":\"foobar\",\"expires_in\":10}");
		let auth = build_authenticator(manager.clone());
		let generator = RecordingUrlGenerator::default();

		auth.storage()
			.set("redirect_uri", "https://app.example.com/cb?x=1")
			.expect("Redirect fixture should persist.");

		let token = auth
			.access_token_from_code(&generator, "code")
			.await
			.expect("The exchange should succeed.");

		assert_eq!(token.token().map(AsRef::as_ref), Some("foobar"));

		let body = manager.last_body().expect("The exchange request should carry a body.");

		assert!(body.contains("grant_type=authorization_code"));
		assert!(body.contains("code=code"));
		assert!(
			body.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb%3Fx%3D1"),
			"The stored redirect URI must be echoed byte-for-byte: {body}",
		);
		assert!(body.contains(&format!("client_id={APP_ID}")));
		assert!(body.contains(&format!("client_secret={APP_SECRET}")));
	}

	#[tokio::test]
	async fn exchange_omits_the_redirect_uri_when_none_is_stored() {
		let manager = StubRequestManager::json("{\"access_token\":\"foobar\"}");
		let auth = build_authenticator(manager.clone());
		let generator = RecordingUrlGenerator::default();

		auth.access_token_from_code(&generator, "code")
			.await
			.expect("The exchange should succeed.");

		let body = manager.last_body().expect("The exchange request should carry a body.");

		assert!(!body.contains("redirect_uri"), "Absent redirect URIs are dropped: {body}");
	}

	#[tokio::test]
	async fn exchange_fails_on_an_empty_response() {
		let manager = StubRequestManager::json("");
		let auth = build_authenticator(manager);
		let generator = RecordingUrlGenerator::default();
		let err = auth
			.access_token_from_code(&generator, "code")
			.await
			.expect_err("An empty body must fail.");

		assert!(matches!(err, Error::Exchange(ExchangeError::EmptyResponse)));
	}

	#[tokio::test]
	async fn exchange_fails_when_the_response_lacks_a_token() {
		let manager = StubRequestManager::json("{\"foo\":\"bar\"}");
		let auth = build_authenticator(manager);
		let generator = RecordingUrlGenerator::default();
		let err = auth
			.access_token_from_code(&generator, "code")
			.await
			.expect_err("A tokenless body must fail.");

		assert!(matches!(err, Error::Exchange(ExchangeError::MissingToken)));
	}

	#[tokio::test]
	async fn exchange_defaults_missing_expiry_to_absent() {
		let manager = StubRequestManager::json("{\"access_token\":\"foobar\"}");
		let auth = build_authenticator(manager);
		let generator = RecordingUrlGenerator::default();
		let token = auth
			.access_token_from_code(&generator, "code")
			.await
			.expect("A body without expires_in should still succeed.");

		assert_eq!(token.expires_in(), None);
	}

	#[test]
	fn clear_storage_implements_log_out() {
		let auth = build_authenticator(Arc::default());

		for key in crate::storage::VALID_KEYS {
			auth.storage().set(key, "value").expect("Fixture entries should persist.");
		}

		auth.clear_storage().expect("Clear should succeed.");

		for key in crate::storage::VALID_KEYS {
			assert_eq!(auth.storage().get(key).expect("Storage should remain readable."), None);
		}
	}

	#[test]
	fn debug_never_leaks_the_client_secret() {
		let auth = build_authenticator(Arc::default());
		let rendered = format!("{auth:?}");

		assert!(rendered.contains(APP_ID));
		assert!(!rendered.contains(APP_SECRET));
	}
}
