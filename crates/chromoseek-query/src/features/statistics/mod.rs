pub mod queries;

pub use queries::{handle, DensityQuery, DENSITY_AGGREGATION, MAX_CHROMOSOME_BUCKETS};
