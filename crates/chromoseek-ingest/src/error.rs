//! Ingestion error types

use chromoseek_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Search store failure: {0}")]
    Store(#[from] StoreError),

    /// Documents still failing after every retry. Already committed documents stay.
    #[error("{failed} documents failed to index for file {}", path.display())]
    DocumentsFailed { path: PathBuf, failed: usize },

    #[error("Ingestion task panicked: {0}")]
    TaskPanicked(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
