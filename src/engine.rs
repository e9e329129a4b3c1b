//! # Narrative Engine
//! Sequences one aggregation run:
//! combine → extract signals → score + rank → insights → history append.
//!
//! Everything before the history append is pure and in-memory; only the
//! append touches disk, and its failure is returned to the caller.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tracing::info;

use crate::combiner::TickerCombiner;
use crate::config::TrackerConfig;
use crate::denylist::Denylist;
use crate::history::{HistoryError, HistoryStore};
use crate::insights::InsightGenerator;
use crate::model::{
    AggregationResult, CombinedCounts, Post, ScoredTicker, SignalMap, SourceBreakdown,
    SourceTickerCounts,
};
use crate::scoring::NarrativeScorer;
use crate::signals::SignalExtractor;
use crate::source_weights::SourceWeights;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("aggregation_runs_total", "Completed aggregation runs.");
        describe_gauge!(
            "aggregation_tickers_tracked",
            "Tickers ranked in the latest run."
        );
        describe_counter!(
            "aggregation_insights_total",
            "Insights emitted, labelled by type."
        );
        describe_counter!(
            "history_write_errors_total",
            "Failed history persistence attempts."
        );
        describe_gauge!("history_entries", "Entries in the history log after the last append.");
    });
}

#[derive(Debug, Clone, Default)]
pub struct NarrativeEngine {
    combiner: TickerCombiner,
    extractor: SignalExtractor,
    scorer: NarrativeScorer,
    insights: InsightGenerator,
}

impl NarrativeEngine {
    pub fn new(
        combiner: TickerCombiner,
        extractor: SignalExtractor,
        scorer: NarrativeScorer,
        insights: InsightGenerator,
    ) -> Self {
        Self {
            combiner,
            extractor,
            scorer,
            insights,
        }
    }

    /// Same components as `default()` but with a substituted weight table and denylist.
    pub fn with_weights_and_denylist(weights: SourceWeights, denylist: Denylist) -> Self {
        let insights = InsightGenerator::new(
            denylist.clone(),
            crate::insights::DEFAULT_EARLY_SOURCES,
            crate::insights::DEFAULT_MAINSTREAM_SOURCES,
            crate::insights::DEFAULT_KEYWORD_ALERT_MIN,
        )
        .with_aliases(&weights);
        Self {
            combiner: TickerCombiner::new(weights, denylist.clone()),
            extractor: SignalExtractor::new(denylist),
            scorer: NarrativeScorer::default(),
            insights,
        }
    }

    pub fn from_config(cfg: &TrackerConfig) -> Self {
        let denylist = cfg.denylist();
        Self {
            combiner: TickerCombiner::new(cfg.source_weights.clone(), denylist.clone()),
            extractor: SignalExtractor::new(denylist.clone()),
            scorer: NarrativeScorer::new(cfg.high_value_keywords.iter().cloned()),
            insights: InsightGenerator::new(
                denylist,
                &cfg.early_sources,
                &cfg.mainstream_sources,
                cfg.keyword_alert_min,
            )
            .with_aliases(&cfg.source_weights),
        }
    }

    pub fn combiner(&self) -> &TickerCombiner {
        &self.combiner
    }

    /// Scored tickers ordered by descending weighted mentions; ties keep
    /// ticker order (stable sort over the sorted map).
    pub fn rank(
        &self,
        combined: &CombinedCounts,
        breakdown: &SourceBreakdown,
        signals: &SignalMap,
    ) -> Vec<ScoredTicker> {
        let mut ordered: Vec<(&String, u64)> = combined.iter().map(|(t, &c)| (t, c)).collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));

        ordered
            .into_iter()
            .map(|(ticker, count)| ScoredTicker {
                ticker: ticker.clone(),
                weighted_mentions: count,
                narrative_score: self.scorer.score(ticker, count, breakdown, signals),
                sources: breakdown
                    .iter()
                    .filter(|(_, per_source)| per_source.contains_key(ticker))
                    .map(|(source, _)| source.clone())
                    .collect(),
            })
            .collect()
    }

    /// Everything except persistence.
    pub fn evaluate(
        &self,
        counts: &SourceTickerCounts,
        posts: &[Post],
    ) -> (CombinedCounts, SourceBreakdown, AggregationResult) {
        let (combined, breakdown) = self.combiner.combine(counts);
        let signals = self.extractor.extract(posts);
        let scored = self.rank(&combined, &breakdown, &signals);
        let insights = self.insights.generate(&combined, &breakdown, &signals);

        (
            combined,
            breakdown,
            AggregationResult {
                scored,
                signals,
                insights,
            },
        )
    }

    /// Full run: evaluate, append the snapshot to `store`, return the ranking.
    pub fn aggregate_all_sources(
        &self,
        counts: &SourceTickerCounts,
        posts: &[Post],
        store: &HistoryStore,
    ) -> Result<AggregationResult, HistoryError> {
        ensure_metrics_described();

        let (combined, breakdown, result) = self.evaluate(counts, posts);

        if let Err(e) = store.append(&combined, &breakdown, &result.signals, &result.insights) {
            counter!("history_write_errors_total").increment(1);
            tracing::error!(error = %e, path = %store.path().display(), "history append failed");
            return Err(e);
        }

        counter!("aggregation_runs_total").increment(1);
        gauge!("aggregation_tickers_tracked").set(result.scored.len() as f64);
        for ins in &result.insights {
            counter!("aggregation_insights_total", "type" => ins.kind.as_str()).increment(1);
        }

        info!(
            sources = breakdown.len(),
            tickers = result.scored.len(),
            signals = result.signals.len(),
            insights = result.insights.len(),
            "aggregation complete"
        );
        Ok(result)
    }
}
