pub mod density;

pub use density::{handle, DensityQuery, DENSITY_AGGREGATION, MAX_CHROMOSOME_BUCKETS};
