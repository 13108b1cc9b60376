use chromoseek_common::{FeatureDocument, FeatureType, Region};
use chromoseek_store::SearchRequest;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::error::{QueryError, Result};
use crate::features::overlaps::{self, FindOverlapsQuery};
use crate::features::shared::PageParams;
use crate::features::FeatureState;

/// Feature type of the document a gene name resolves to. Transcript records
/// are stored under this type.
pub const GENE_FEATURE_TYPE: &str = "gene";

/// Features of one type lying within a named gene's interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesByGeneQuery {
    pub gene_name: String,
    pub feature_type: FeatureType,
}

impl FeaturesByGeneQuery {
    pub fn new(gene_name: impl Into<String>, feature_type: impl Into<FeatureType>) -> Self {
        Self {
            gene_name: gene_name.into(),
            feature_type: feature_type.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.gene_name.trim().is_empty() {
            return Err(QueryError::validation("gene name cannot be empty"));
        }
        if self.feature_type.as_str().trim().is_empty() {
            return Err(QueryError::validation("feature type cannot be empty"));
        }
        Ok(())
    }

    /// Lookup for the single gene document carrying this name.
    pub fn lookup_query(&self) -> Value {
        json!({
            "bool": {
                "filter": [
                    { "term": { "feature_type": GENE_FEATURE_TYPE } },
                    { "term": { "gene_name": self.gene_name } }
                ]
            }
        })
    }
}

/// The gene's stored `[gte, lt)` bounds, reused verbatim as an inclusive
/// query region.
pub fn resolve_region(gene: &FeatureDocument) -> Region {
    Region::new(gene.chrom.clone(), gene.location.gte, gene.location.lt)
}

#[instrument(skip(state, query), fields(gene = %query.gene_name, feature_type = %query.feature_type))]
pub async fn handle(state: &FeatureState, query: FeaturesByGeneQuery) -> Result<Vec<FeatureDocument>> {
    query.validate()?;

    let lookup = SearchRequest::new(query.lookup_query(), 0, 1);
    let gene = state
        .store
        .search(&state.index, &lookup)
        .await?
        .into_documents()
        .into_iter()
        .next()
        .ok_or_else(|| QueryError::NotFound(format!("Gene '{}' not found", query.gene_name)))?;

    let region = resolve_region(&gene);
    debug!(%region, "Resolved gene interval");

    let overlaps = FindOverlapsQuery::new(vec![region])
        .with_feature_types(vec![query.feature_type])
        .with_page(PageParams::everything());

    let documents = overlaps::handle(state, overlaps).await?;
    info!(count = documents.len(), "Found features within gene");
    Ok(documents)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chromoseek_common::{Location, Strand};

    #[test]
    fn test_lookup_query_shape() {
        let query = FeaturesByGeneQuery::new("DDX11L1", "exon");
        assert_eq!(
            query.lookup_query(),
            json!({
                "bool": {
                    "filter": [
                        { "term": { "feature_type": "gene" } },
                        { "term": { "gene_name": "DDX11L1" } }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_resolve_region_reuses_bounds() {
        let gene = FeatureDocument {
            chrom: "1".to_string(),
            location: Location { gte: 11869, lt: 14410 },
            feature_type: FeatureType::Gene,
            feature_id: "ENST00000456328".to_string(),
            gene_name: Some("DDX11L1".to_string()),
            strand: Strand::Forward,
            score: 0.0,
            source_file: "genes.gtf".to_string(),
        };

        assert_eq!(resolve_region(&gene), Region::new("1", 11869, 14410));
    }

    #[test]
    fn test_validate_rejects_blank_gene() {
        let query = FeaturesByGeneQuery::new("  ", "exon");
        assert!(matches!(query.validate(), Err(QueryError::Validation(_))));
    }
}
