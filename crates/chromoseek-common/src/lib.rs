//! ChromoSeek Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the ChromoSeek workspace.
//!
//! # Overview
//!
//! - **Types**: the canonical interval-document model every input format normalizes to
//! - **Error Handling**: the shared error and result types
//! - **Logging**: tracing subscriber setup used by every binary
//!
//! # Example
//!
//! ```
//! use chromoseek_common::types::Region;
//!
//! let region: Region = "1:0-120".parse().unwrap();
//! assert_eq!(region.chrom, "1");
//! assert_eq!(region.end, 120);
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{ChromoseekError, Result};
pub use types::{FeatureDocument, FeatureType, Location, Region, Strand};
