//! ChromoSeek Query Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Translates genomic-interval questions into structured queries for the
//! external search store and shapes the answers.
//!
//! # Features
//!
//! - **overlaps**: documents intersecting any of a list of regions, optionally
//!   restricted to a set of feature types
//! - **genes**: resolve a gene name to its transcript interval, then run an
//!   overlap query over it
//! - **statistics**: per-chromosome document counts for one feature type
//!
//! Each feature exposes a query type with `validate()` / request builders and an
//! async `handle` function taking a [`FeatureState`].
//!
//! # Example
//!
//! ```no_run
//! use chromoseek_common::Region;
//! use chromoseek_query::features::{overlaps::FindOverlapsQuery, FeatureState};
//! use chromoseek_store::{ElasticClient, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StoreConfig::from_env()?;
//!     let state = FeatureState::new(Arc::new(ElasticClient::new(&config)?), config.index);
//!
//!     let query = FindOverlapsQuery::new(vec![Region::new("1", 0, 120)]);
//!     let documents = chromoseek_query::features::overlaps::handle(&state, query).await?;
//!     println!("{} overlapping features", documents.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod features;

pub use error::{QueryError, Result};
pub use features::FeatureState;
