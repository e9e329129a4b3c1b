use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{debug, error};

use crate::config::TrackerConfig;
use crate::dashboard::{build_dashboard, Dashboard};
use crate::engine::NarrativeEngine;
use crate::extract::TextExtractor;
use crate::history::{HistoryEntry, HistoryStore};
use crate::model::AggregationResult;
use crate::snapshot::Snapshot;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<HistoryStore>,
    pub engine: Arc<NarrativeEngine>,
    pub extractor: Arc<TextExtractor>,
}

impl AppState {
    pub fn from_config(cfg: &TrackerConfig) -> Self {
        Self {
            store: Arc::new(cfg.history_store()),
            engine: Arc::new(cfg.engine()),
            extractor: Arc::new(cfg.text_extractor()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/dashboard", get(dashboard))
        .route("/api/history", get(history))
        .route("/api/aggregate", post(aggregate))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    let history = state.store.load();
    Json(build_dashboard(&history))
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<HistoryEntry>> {
    let n = q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Json(state.store.last_n(n))
}

async fn aggregate(
    State(state): State<AppState>,
    Json(snapshot): Json<Snapshot>,
) -> Result<Json<AggregationResult>, (StatusCode, String)> {
    debug!(
        sources = snapshot.sources.len(),
        posts = snapshot.posts.len(),
        texts = snapshot.texts.len(),
        "aggregate request"
    );

    // History append does blocking file IO under a mutex.
    let run = tokio::task::spawn_blocking(move || {
        let (counts, posts) = snapshot.resolve(&state.extractor);
        state
            .engine
            .aggregate_all_sources(&counts, &posts, &state.store)
    })
    .await;

    match run {
        Ok(Ok(result)) => Ok(Json(result)),
        Ok(Err(e)) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
        Err(join_err) => {
            error!(error = %join_err, "aggregation task failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "aggregation task failed".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_query_limit_is_optional() {
        let q: HistoryQuery = serde_json::from_str("{}").unwrap();
        assert!(q.limit.is_none());
    }
}
