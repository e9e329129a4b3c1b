//! Narrative tracker dashboard server.
//! Boots the axum HTTP server over the history log, plus `/metrics`.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use narrative_tracker::metrics::Metrics;
use narrative_tracker::{create_router, AppState, TrackerConfig};

const ENV_DASHBOARD_ADDR: &str = "DASHBOARD_ADDR";
const DEFAULT_DASHBOARD_ADDR: &str = "0.0.0.0:5000";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("narrative_tracker=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = TrackerConfig::load_default()?;
    let metrics = Metrics::install(cfg.history_cap)?;

    let state = AppState::from_config(&cfg);
    info!(
        history = %state.store.path().display(),
        entries = state.store.load().len(),
        "history store ready"
    );

    let app = create_router(state).merge(metrics.router());

    let addr =
        std::env::var(ENV_DASHBOARD_ADDR).unwrap_or_else(|_| DEFAULT_DASHBOARD_ADDR.to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "dashboard listening");

    axum::serve(listener, app).await.context("serving dashboard")?;
    Ok(())
}
