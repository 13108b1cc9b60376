pub mod queries;

pub use queries::{handle, resolve_region, FeaturesByGeneQuery, GENE_FEATURE_TYPE};
