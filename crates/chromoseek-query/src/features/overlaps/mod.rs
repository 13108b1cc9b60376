pub mod queries;

pub use queries::{handle, FindOverlapsQuery};
