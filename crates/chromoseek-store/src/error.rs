//! Store error types

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("Search store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected search store response: {0}")]
    UnexpectedResponse(String),

    #[error("Unsupported query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Connection problems, timeouts, throttling (429) and server-side (5xx)
    /// failures are transient; everything else is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            StoreError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
