use std::fmt;

use reqwest::StatusCode;
use shared::validation::ValidationError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Coarse failure classes callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401: the session is missing or expired.
    AuthenticationFailed,
    /// 403: signed in, but not allowed.
    AccessDenied,
    /// 404: the resource does not exist.
    NotFound,
    /// The server could not be reached.
    NetworkUnavailable,
    /// Any other failure; the message carries the server's explanation.
    RequestFailed,
}

impl ErrorKind {
    /// Stable snake-case label, used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AccessDenied => "access_denied",
            Self::NotFound => "not_found",
            Self::NetworkUnavailable => "network_unavailable",
            Self::RequestFailed => "request_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified request failure: a kind plus a message fit for display.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn authentication_failed() -> Self {
        Self::new(ErrorKind::AuthenticationFailed, "Authentication failed")
    }

    pub fn access_denied() -> Self {
        Self::new(ErrorKind::AccessDenied, "Access denied")
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, "Resource not found")
    }

    pub fn network_unavailable() -> Self {
        Self::new(
            ErrorKind::NetworkUnavailable,
            "Network error - unable to connect to server",
        )
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestFailed, message)
    }

    /// Classifies a non-success status and its body text.
    ///
    /// 401, 403 and 404 map to fixed kinds. Anything else becomes
    /// [`ErrorKind::RequestFailed`] carrying the server's message: the
    /// `message` (or `error`) field of a JSON object body, else the trimmed
    /// body text, else `Request failed with status N`.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::authentication_failed(),
            StatusCode::FORBIDDEN => Self::access_denied(),
            StatusCode::NOT_FOUND => Self::not_found(),
            _ => Self::request_failed(server_message(body).unwrap_or_else(|| {
                format!("Request failed with status {}", status.as_u16())
            })),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_authentication_failure(&self) -> bool {
        self.kind == ErrorKind::AuthenticationFailed
    }

    /// Whether this failure means the resource is gone.
    ///
    /// Besides [`ErrorKind::NotFound`], a message mentioning `not found` or
    /// `404` counts, since some endpoints report missing rows with other
    /// statuses.
    pub fn is_not_found(&self) -> bool {
        if self.kind == ErrorKind::NotFound {
            return true;
        }
        let lowered = self.message.to_lowercase();
        lowered.contains("not found") || lowered.contains("404")
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::request_failed(format!("Invalid request: {err}"));
        }
        if err.is_decode() {
            return Self::request_failed(format!("Invalid response: {err}"));
        }
        if let Some(status) = err.status() {
            return Self::from_status(status, "");
        }
        Self::network_unavailable()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::request_failed(err.to_string())
    }
}

fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_str(trimmed) {
        let from_json = ["message", "error"].iter().find_map(|key| {
            fields
                .get(*key)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        });
        if from_json.is_some() {
            return from_json;
        }
    }

    Some(trimmed.to_string())
}
