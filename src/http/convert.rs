//! Decoders turning raw provider responses into structured values.

// self
use crate::{_prelude::*, http::RawResponse};

/// JSON object produced by [`ResponseConverter::to_map`].
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Error type produced when a response body cannot be decoded.
#[derive(Debug, ThisError)]
pub enum ConvertError {
	/// Body is not valid UTF-8.
	#[error("Response body is not valid UTF-8.")]
	NotUtf8(#[from] std::string::FromUtf8Error),
	/// Body is not valid JSON.
	#[error("Response body is not valid JSON.")]
	Json(#[source] serde_path_to_error::Error<serde_json::Error>),
	/// Body decoded to a JSON value that is not an object.
	#[error("Response body decoded to a non-object JSON value.")]
	UnexpectedShape,
}

/// Stateless helpers converting a [`RawResponse`] body into the representation
/// the caller asked for.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseConverter;
impl ResponseConverter {
	/// Decodes a JSON-shaped body into a structured map.
	///
	/// Empty bodies, JSON `null`, and empty objects yield `None`; the caller
	/// decides whether an absent map is fatal.
	pub fn to_map(response: &RawResponse) -> Result<Option<JsonMap>, ConvertError> {
		if response.body.is_empty() {
			return Ok(None);
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
		let value: serde_json::Value =
			serde_path_to_error::deserialize(&mut deserializer).map_err(ConvertError::Json)?;

		match value {
			serde_json::Value::Null => Ok(None),
			serde_json::Value::Object(map) if map.is_empty() => Ok(None),
			serde_json::Value::Object(map) => Ok(Some(map)),
			_ => Err(ConvertError::UnexpectedShape),
		}
	}

	/// Returns the body as text.
	pub fn to_text(response: &RawResponse) -> Result<String, ConvertError> {
		Ok(String::from_utf8(response.body.clone())?)
	}
}
