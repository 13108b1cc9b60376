//! Error types for ChromoSeek

use thiserror::Error;

/// Result type alias for ChromoSeek operations
pub type Result<T> = std::result::Result<T, ChromoseekError>;

/// Main error type shared across the workspace
#[derive(Error, Debug)]
pub enum ChromoseekError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid region '{input}': {reason}")]
    InvalidRegion { input: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ChromoseekError {
    pub fn invalid_region(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRegion {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
