//! One-shot scan: `narrative_scan <snapshot.json>`.
//! Aggregates the snapshot, appends it to history and prints the report.

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use narrative_tracker::report::render_report;
use narrative_tracker::snapshot::Snapshot;
use narrative_tracker::TrackerConfig;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("narrative_tracker=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: narrative_scan <snapshot.json>");
    };

    let cfg = TrackerConfig::load_default()?;
    let (counts, posts) = Snapshot::from_path(&path)?.resolve(&cfg.text_extractor());

    let result = cfg
        .engine()
        .aggregate_all_sources(&counts, &posts, &cfg.history_store())?;

    print!("{}", render_report(&result));
    Ok(())
}
