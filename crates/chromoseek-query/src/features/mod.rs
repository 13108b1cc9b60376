//! Query features
//!
//! Organized like the rest of the workspace's read paths: one module per
//! feature, each with a `queries` submodule holding the query type and its
//! handler.

pub mod genes;
pub mod overlaps;
pub mod shared;
pub mod statistics;

use chromoseek_store::SearchStore;
use std::sync::Arc;

/// Shared state handed to every query handler
#[derive(Clone)]
pub struct FeatureState {
    pub store: Arc<dyn SearchStore>,
    /// Collection holding feature documents
    pub index: String,
}

impl FeatureState {
    pub fn new(store: Arc<dyn SearchStore>, index: impl Into<String>) -> Self {
        Self {
            store,
            index: index.into(),
        }
    }
}
