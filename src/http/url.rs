//! Provider URL construction: domain aliases, ordered query parameters, generators.

// self
use crate::_prelude::*;

/// Ordered query-parameter mapping consumed by [`UrlGenerator`] implementations.
///
/// Entries with a `None` value are omitted from the generated query entirely,
/// mirroring how the provider treats unset parameters.
pub type QueryParams = BTreeMap<String, Option<String>>;

/// Known provider hosts addressable by alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DomainAlias {
	/// The interactive `www` host serving the authorization pages.
	Www,
	/// The `api` host serving authenticated resource calls.
	Api,
}
impl DomainAlias {
	/// Returns the stable alias label.
	pub const fn as_str(self) -> &'static str {
		match self {
			DomainAlias::Www => "www",
			DomainAlias::Api => "api",
		}
	}
}
impl Display for DomainAlias {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Builds provider URLs from a domain alias, path, and query parameters.
///
/// The query must be RFC 3986 percent-encoded (reserved characters escaped,
/// space as `%20`); results are returned verbatim to the caller.
pub trait UrlGenerator
where
	Self: Send + Sync,
{
	/// Returns the URL for the given alias, path (no leading slash), and parameters.
	fn url(&self, alias: DomainAlias, path: &str, params: &QueryParams) -> String;
}

/// Default generator over the fixed Reddit hosts.
#[derive(Clone, Debug)]
pub struct RedditUrlGenerator {
	www: String,
	api: String,
}
impl RedditUrlGenerator {
	/// Creates a generator for custom host roots (tests point this at a mock server).
	pub fn with_hosts(www: impl Into<String>, api: impl Into<String>) -> Self {
		let trim = |mut host: String| {
			while host.ends_with('/') {
				host.pop();
			}

			host
		};

		Self { www: trim(www.into()), api: trim(api.into()) }
	}
}
impl Default for RedditUrlGenerator {
	fn default() -> Self {
		Self::with_hosts("https://www.reddit.com", "https://oauth.reddit.com")
	}
}
impl UrlGenerator for RedditUrlGenerator {
	fn url(&self, alias: DomainAlias, path: &str, params: &QueryParams) -> String {
		let host = match alias {
			DomainAlias::Www => &self.www,
			DomainAlias::Api => &self.api,
		};
		let mut url = format!("{host}/{path}");
		let query = encode_query(params);

		if !query.is_empty() {
			url.push('?');
			url.push_str(&query);
		}

		url
	}
}

/// Renders a query string per RFC 3986, skipping absent values.
pub fn encode_query(params: &QueryParams) -> String {
	let mut buf = String::new();

	for (key, value) in params {
		let Some(value) = value else { continue };

		if !buf.is_empty() {
			buf.push('&');
		}

		buf.push_str(&urlencoding::encode(key));
		buf.push('=');
		buf.push_str(&urlencoding::encode(value));
	}

	buf
}
