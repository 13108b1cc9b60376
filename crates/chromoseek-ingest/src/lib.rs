//! ChromoSeek Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Normalizes gene annotation (GTF) and interval (BED) files into feature
//! documents and bulk-loads them into the search store.
//!
//! # Pipeline
//!
//! 1. [`orchestrator::provision_index`] creates the collection if missing
//! 2. [`orchestrator::discover`] finds at most one GTF file and every BED file
//! 3. [`loader::BulkLoader`] streams each file in batches with bounded retries
//! 4. [`orchestrator::IngestOrchestrator`] runs the files concurrently and
//!    collects an [`orchestrator::IngestSummary`]
//!
//! # Example
//!
//! ```no_run
//! use chromoseek_ingest::{IngestConfig, IngestOrchestrator};
//! use chromoseek_store::{ElasticClient, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store_config = StoreConfig::from_env()?;
//!     let store = Arc::new(ElasticClient::new(&store_config)?);
//!
//!     let orchestrator =
//!         IngestOrchestrator::new(store, store_config.index, IngestConfig::from_env()?);
//!     let summary = orchestrator.run().await?;
//!     println!("indexed {} documents", summary.total_indexed());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod normalizer;
pub mod orchestrator;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use loader::{BulkLoader, FileReport, FileTask};
pub use normalizer::{AnnotationFormat, DocumentStream, RecordError, RecordParser};
pub use orchestrator::{discover, provision_index, IngestOrchestrator, IngestSummary};
