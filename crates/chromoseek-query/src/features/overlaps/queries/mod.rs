pub mod find_overlaps;

pub use find_overlaps::{handle, region_clause, FindOverlapsQuery};
