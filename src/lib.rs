// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod model;

// Aggregation pipeline
pub mod combiner;
pub mod denylist;
pub mod engine;
pub mod insights;
pub mod scoring;
pub mod signals;
pub mod source_weights;
pub mod trend;

// Persistence & views
pub mod dashboard;
pub mod history;
pub mod report;

// Inputs
pub mod extract;
pub mod snapshot;

// Server & configuration
pub mod api;
pub mod config;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::TrackerConfig;
pub use crate::engine::NarrativeEngine;
pub use crate::history::{HistoryError, HistoryStore};
pub use crate::model::{AggregationResult, Insight, InsightKind, Post, ScoredTicker};

use crate::model::SourceTickerCounts;

/// One aggregation run with the default engine: combine, score, rank,
/// generate insights and append the snapshot to `store`.
pub fn aggregate_all_sources(
    counts: &SourceTickerCounts,
    posts: &[Post],
    store: &HistoryStore,
) -> Result<AggregationResult, HistoryError> {
    NarrativeEngine::default().aggregate_all_sources(counts, posts, store)
}
