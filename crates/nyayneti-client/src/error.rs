//! Backend HTTP error handling.

use nyayneti_core::Error;
use serde_json::Value as JsonValue;

/// Error classes derived from backend HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorCode {
    /// Malformed request (bad template type, missing fields).
    BadRequest,
    /// Document, template or artifact not found.
    NotFound,
    /// Request understood but could not be processed.
    Unprocessable,
    /// Backend overloaded.
    RateLimited,
    /// Server error.
    ServerError,
    /// Anything else.
    Unknown,
}

impl BackendErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            422 => Self::Unprocessable,
            429 => Self::RateLimited,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError)
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers errors as `{"error": "..."}`; anything else is
/// returned verbatim.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(JsonValue::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Convert a non-success response into a core error.
pub fn to_core_error(status: u16, body: &str) -> Error {
    let message = error_message(body);
    match BackendErrorCode::from_status(status) {
        BackendErrorCode::NotFound => Error::NotFound(message),
        BackendErrorCode::BadRequest | BackendErrorCode::Unprocessable => {
            Error::InvalidInput(message)
        }
        _ => Error::Backend { status, message },
    }
}
