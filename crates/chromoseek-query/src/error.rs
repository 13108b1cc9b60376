//! Query error types

use chromoseek_common::ChromoseekError;
use chromoseek_store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// A lookup found nothing. Distinct from a failing store.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Search store failure: {0}")]
    Store(#[from] StoreError),
}

impl QueryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound(_))
    }
}

impl From<ChromoseekError> for QueryError {
    fn from(err: ChromoseekError) -> Self {
        QueryError::Validation(err.to_string())
    }
}
