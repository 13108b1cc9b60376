//! Declared schema of the feature collection

use serde_json::{json, Value};

/// Field mappings for [`chromoseek_common::FeatureDocument`].
///
/// `location` is an integer range so the service can answer intersection
/// queries directly; every identifier is an exact-match keyword.
pub fn feature_mappings() -> Value {
    json!({
        "properties": {
            "chrom": { "type": "keyword" },
            "location": { "type": "integer_range" },
            "feature_type": { "type": "keyword" },
            "feature_id": { "type": "keyword" },
            "gene_name": { "type": "keyword" },
            "strand": { "type": "keyword" },
            "score": { "type": "float" },
            "source_file": { "type": "keyword" }
        }
    })
}
