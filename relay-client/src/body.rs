//! Request encoding and response decoding.

use std::borrow::Cow;

use reqwest::{StatusCode, header::HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// What to send as the request body. The caller picks the encoding; it is
/// never inferred from the content.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Sent as `application/json`.
    Json(Value),
    /// Sent verbatim as `text/plain`.
    Text(String),
}

impl RequestBody {
    /// Serializes `payload` into a JSON body.
    ///
    /// # Errors
    /// Returns [`ApiError`] with [`crate::ErrorKind::RequestFailed`] if the
    /// payload cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> ApiResult<Self> {
        serde_json::to_value(payload)
            .map(Self::Json)
            .map_err(|err| ApiError::request_failed(format!("Invalid request body: {err}")))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// The `Content-Type` this body is sent with.
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Json(_) => Some("application/json"),
            Self::Text(_) => Some("text/plain"),
        }
    }
}

/// A successfully decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No content.
    Empty,
    /// Parsed JSON.
    Json(Value),
    /// Anything that was not declared as JSON.
    Text(String),
}

impl ResponseBody {
    /// Decodes a success response.
    ///
    /// 204 and 205 are always empty. A JSON content type is parsed, with an
    /// empty payload treated as empty; everything else is kept as text.
    /// Invalid UTF-8 in a text body is replaced with U+FFFD.
    ///
    /// # Errors
    /// Returns [`ApiError`] when a body declared as JSON does not parse.
    pub fn decode(
        status: StatusCode,
        content_type: Option<&HeaderValue>,
        bytes: &[u8],
    ) -> ApiResult<Self> {
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Ok(Self::Empty);
        }

        if is_json(content_type) {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Self::Empty);
            }
            return serde_json::from_slice(bytes)
                .map(Self::Json)
                .map_err(|err| ApiError::request_failed(format!("Invalid JSON response: {err}")));
        }

        Ok(Self::Text(text_lossy(bytes)))
    }

    /// Whether there is nothing meaningful in the body.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Json(value) => value.is_null(),
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    /// Deserializes the body into a model.
    ///
    /// Text bodies are parsed as JSON too, for servers that omit the
    /// content type.
    ///
    /// # Errors
    /// Returns [`ApiError`] when the body is empty or does not match `T`.
    pub fn into_model<T: DeserializeOwned>(self) -> ApiResult<T> {
        let value = match self {
            Self::Json(value) => value,
            Self::Text(text) if !text.trim().is_empty() => serde_json::from_str(&text)
                .map_err(|err| ApiError::request_failed(format!("Unexpected response: {err}")))?,
            Self::Empty | Self::Text(_) => {
                return Err(ApiError::request_failed("Unexpected empty response"));
            }
        };

        serde_json::from_value(value)
            .map_err(|err| ApiError::request_failed(format!("Unexpected response: {err}")))
    }

    /// Like [`Self::into_model`], but an empty body yields `None`.
    ///
    /// # Errors
    /// Returns [`ApiError`] when a non-empty body does not match `T`.
    pub fn into_optional_model<T: DeserializeOwned>(self) -> ApiResult<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.into_model().map(Some)
    }
}

fn text_lossy(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            debug!(len = bytes.len(), "response body is not valid UTF-8; replaced invalid bytes");
            text
        }
    }
}

fn is_json(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            let essence = value.split(';').next().unwrap_or_default().trim();
            essence.eq_ignore_ascii_case("application/json")
                || essence.to_ascii_lowercase().ends_with("+json")
        })
}
