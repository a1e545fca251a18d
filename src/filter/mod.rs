pub mod search;

pub use search::{SearchFilter, SearchParams};
