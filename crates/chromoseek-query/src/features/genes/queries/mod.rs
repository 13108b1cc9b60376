pub mod features_by_gene;

pub use features_by_gene::{handle, resolve_region, FeaturesByGeneQuery, GENE_FEATURE_TYPE};
