//! Error types for the NyayNeti drafting client.

use thiserror::Error;

/// Result type alias using the drafting client's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for drafting backend operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request failed before a response was received
    #[error("Request error: {0}")]
    Request(String),

    /// Backend answered with a non-success HTTP status
    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// Context analysis did not produce extracted fields
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Draft generation failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Request(_) => true,
            Error::Backend { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
