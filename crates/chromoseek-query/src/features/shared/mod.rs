pub mod pagination;

pub use pagination::{PageParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
