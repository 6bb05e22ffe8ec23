//! Read-side queries: text search and statistics

pub mod search;
pub mod stats;

pub use search::search;
pub use stats::{statistics, statistics_at, Stats};
