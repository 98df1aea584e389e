//! Aggregation-and-cache engine.
//!
//! Fans out to the upstream sources, merges their records, and memoizes the
//! merged batch per query fingerprint.

pub mod cache;
pub mod engine;
pub mod fallback;
pub mod plan;
pub mod service;
pub mod stats;

pub use cache::{Fingerprint, ResponseCache};
pub use engine::Aggregator;
pub use plan::FetchPlan;
pub use service::{stats_query, QuakeService, StatsReport};
pub use stats::summarize;
