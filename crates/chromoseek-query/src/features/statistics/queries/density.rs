//! Per-chromosome feature density

use chromoseek_common::FeatureType;
use chromoseek_store::SearchRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::error::{QueryError, Result};
use crate::features::FeatureState;

/// Name of the terms aggregation over `chrom`.
pub const DENSITY_AGGREGATION: &str = "features_per_chrom";

/// Chromosomes beyond this many buckets are dropped from the result.
pub const MAX_CHROMOSOME_BUCKETS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityQuery {
    pub feature_type: FeatureType,
}

impl DensityQuery {
    pub fn new(feature_type: impl Into<FeatureType>) -> Self {
        Self {
            feature_type: feature_type.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.feature_type.as_str().trim().is_empty() {
            return Err(QueryError::validation("feature type cannot be empty"));
        }
        Ok(())
    }

    /// Counts only: no documents, no total.
    pub fn build_request(&self) -> SearchRequest {
        let query = json!({
            "bool": {
                "filter": [
                    { "term": { "feature_type": self.feature_type } }
                ]
            }
        });

        SearchRequest::new(query, 0, 0)
            .with_aggs(json!({
                DENSITY_AGGREGATION: {
                    "terms": { "field": "chrom", "size": MAX_CHROMOSOME_BUCKETS }
                }
            }))
            .with_track_total_hits(false)
    }
}

/// Chromosome name to document count, for chromosomes with at least one match.
#[instrument(skip(state, query), fields(feature_type = %query.feature_type))]
pub async fn handle(state: &FeatureState, query: DensityQuery) -> Result<BTreeMap<String, u64>> {
    query.validate()?;

    let response = state.store.search(&state.index, &query.build_request()).await?;
    let counts: BTreeMap<String, u64> = response
        .buckets(DENSITY_AGGREGATION)
        .iter()
        .map(|bucket| (bucket.key.clone(), bucket.doc_count))
        .collect();

    debug!(chromosomes = counts.len(), "Density aggregation complete");
    Ok(counts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = DensityQuery::new("exon").build_request();

        assert_eq!(request.size, 0);
        assert_eq!(request.track_total_hits, Some(false));
        assert_eq!(
            request.query,
            json!({ "bool": { "filter": [{ "term": { "feature_type": "exon" } }] } })
        );
        assert_eq!(
            request.aggs.unwrap(),
            json!({ "features_per_chrom": { "terms": { "field": "chrom", "size": 100 } } })
        );
    }
}
