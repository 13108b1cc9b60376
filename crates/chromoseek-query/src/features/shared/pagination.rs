//! Shared pagination utilities
//!
//! Overlap queries page with a zero-based offset (`skip`) and a page size
//! (`limit`). Result order is whatever the store returns; no sort is applied,
//! so pages are only stable while the collection is unchanged.
//!
//! # Examples
//!
//! ```
//! use chromoseek_query::features::shared::PageParams;
//!
//! let params = PageParams::new(Some(200), None);
//! assert_eq!(params.skip(), 200);
//! assert_eq!(params.limit(), 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u64 = 5000;

/// Offset-based pagination request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PageParams {
    /// Zero-based offset. Defaults to 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,

    /// Page size. Defaults to 100; must be within 1..=5000.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl PageParams {
    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Self {
        Self { skip, limit }
    }

    /// The largest page, starting at the first result.
    pub fn everything() -> Self {
        Self::new(Some(0), Some(MAX_PAGE_SIZE))
    }

    pub fn skip(&self) -> u64 {
        self.skip.unwrap_or(0)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Reject page sizes outside `1..=MAX_PAGE_SIZE` instead of clamping them.
    pub fn validate(&self) -> Result<()> {
        let limit = self.limit();
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(QueryError::validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, limit
            )));
        }
        Ok(())
    }
}
