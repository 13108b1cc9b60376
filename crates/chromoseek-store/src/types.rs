//! Request and response shapes exchanged with the search service

use chromoseek_common::FeatureDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Body of a `_search` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: Value,
    pub from: u64,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_total_hits: Option<bool>,
}

impl SearchRequest {
    pub fn new(query: Value, from: u64, size: u64) -> Self {
        Self {
            query,
            from,
            size,
            aggs: None,
            track_total_hits: None,
        }
    }

    pub fn with_aggs(mut self, aggs: Value) -> Self {
        self.aggs = Some(aggs);
        self
    }

    pub fn with_track_total_hits(mut self, track: bool) -> Self {
        self.track_total_hits = Some(track);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    pub hits: Hits,
    #[serde(default)]
    pub aggregations: HashMap<String, TermsAggregation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source")]
    pub source: FeatureDocument,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermsAggregation {
    #[serde(default)]
    pub buckets: Vec<TermsBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsBucket {
    pub key: String,
    pub doc_count: u64,
}

impl SearchResponse {
    pub fn from_documents(documents: Vec<FeatureDocument>) -> Self {
        Self {
            hits: Hits {
                hits: documents.into_iter().map(|source| Hit { source }).collect(),
            },
            aggregations: HashMap::new(),
        }
    }

    /// Consume the response, keeping only the hit sources in store order.
    pub fn into_documents(self) -> Vec<FeatureDocument> {
        self.hits.hits.into_iter().map(|hit| hit.source).collect()
    }

    /// Buckets of a named terms aggregation; empty when the store returned none.
    pub fn buckets(&self, name: &str) -> &[TermsBucket] {
        self.aggregations
            .get(name)
            .map(|agg| agg.buckets.as_slice())
            .unwrap_or_default()
    }
}

/// A document the store refused during a bulk write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    /// Position of the document within the submitted batch
    pub position: usize,
    pub status: u16,
    pub reason: String,
}

impl BulkFailure {
    /// Throttled documents may be resubmitted.
    pub fn is_transient(&self) -> bool {
        self.status == 429
    }
}

/// Per-batch accounting returned by [`crate::SearchStore::bulk`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub succeeded: usize,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn all_succeeded(count: usize) -> Self {
        Self {
            succeeded: count,
            failed: Vec::new(),
        }
    }
}
