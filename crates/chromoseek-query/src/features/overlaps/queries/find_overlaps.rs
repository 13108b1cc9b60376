use chromoseek_common::{FeatureDocument, FeatureType, Region};
use chromoseek_store::SearchRequest;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::features::shared::PageParams;
use crate::features::FeatureState;

/// Documents intersecting any of `regions`.
///
/// Region bounds are inclusive on both ends; a stored `[gte, lt)` interval
/// matches when it shares at least one position with the region.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FindOverlapsQuery {
    pub regions: Vec<Region>,
    /// Empty means every feature type
    #[serde(default)]
    pub feature_types: Vec<FeatureType>,
    #[serde(flatten)]
    pub page: PageParams,
}

impl FindOverlapsQuery {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            ..Default::default()
        }
    }

    pub fn with_feature_types(mut self, feature_types: Vec<FeatureType>) -> Self {
        self.feature_types = feature_types;
        self
    }

    pub fn with_page(mut self, page: PageParams) -> Self {
        self.page = page;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.page.validate()?;
        for region in &self.regions {
            region.validate()?;
        }
        Ok(())
    }

    /// The structured query body: one clause per region, any of which may
    /// match, plus an optional feature-type restriction.
    pub fn build_query(&self) -> Value {
        let should: Vec<Value> = self.regions.iter().map(region_clause).collect();

        let mut bool_query = json!({
            "should": should,
            "minimum_should_match": 1,
        });

        if !self.feature_types.is_empty() {
            bool_query["filter"] = json!([
                { "terms": { "feature_type": self.feature_types } }
            ]);
        }

        json!({ "bool": bool_query })
    }

    pub fn build_request(&self) -> SearchRequest {
        SearchRequest::new(self.build_query(), self.page.skip(), self.page.limit())
    }
}

/// Exact chromosome match combined with an intersecting range on `location`.
pub fn region_clause(region: &Region) -> Value {
    json!({
        "bool": {
            "filter": [
                { "term": { "chrom": region.chrom } },
                {
                    "range": {
                        "location": {
                            "gte": region.start,
                            "lte": region.end,
                            "relation": "intersects",
                        }
                    }
                }
            ]
        }
    })
}

#[instrument(skip(state, query), fields(regions = query.regions.len(), from = query.page.skip(), limit = query.page.limit()))]
pub async fn handle(state: &FeatureState, query: FindOverlapsQuery) -> Result<Vec<FeatureDocument>> {
    query.validate()?;

    if query.regions.is_empty() {
        debug!("No regions requested, skipping store call");
        return Ok(Vec::new());
    }

    let response = state.store.search(&state.index, &query.build_request()).await?;
    let documents = response.into_documents();

    debug!(hits = documents.len(), "Overlap query complete");
    Ok(documents)
}
