//! ChromoSeek Store
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! The seam between ChromoSeek and the external document search service that
//! performs range intersection, term filtering and aggregation.
//!
//! - [`SearchStore`]: the narrow interface the query and ingestion crates use
//! - [`ElasticClient`]: HTTP implementation for an Elasticsearch-compatible service
//! - [`MemoryStore`]: in-process implementation used for dry runs and tests
//! - [`mapping`]: the declared schema of the feature collection
//!
//! # Example
//!
//! ```no_run
//! use chromoseek_store::{ElasticClient, SearchStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::from_env()?;
//!     let store = ElasticClient::new(&config)?;
//!     let exists = store.index_exists(&config.index).await?;
//!     println!("{} exists: {}", config.index, exists);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chromoseek_common::FeatureDocument;

pub mod client;
pub mod config;
pub mod error;
pub mod mapping;
pub mod memory;
pub mod types;

pub use client::ElasticClient;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use types::{BulkFailure, BulkOutcome, SearchRequest, SearchResponse, TermsBucket};

/// Operations ChromoSeek needs from the external search service.
///
/// Implementations must be safe to share between concurrent callers; no
/// application-level locking is layered on top.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Whether the collection exists.
    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Create the collection with the given field mappings.
    async fn create_index(&self, index: &str, mappings: &serde_json::Value) -> Result<()>;

    /// Run a structured query, returning matching sources and aggregation buckets.
    async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse>;

    /// Write a batch of documents, reporting per-document failures.
    async fn bulk(&self, index: &str, documents: &[FeatureDocument]) -> Result<BulkOutcome>;
}
