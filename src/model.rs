//! Shared data shapes of one aggregation run.
//!
//! All maps are `BTreeMap` so iteration (and therefore JSON output, ranking
//! tie-breaks and insight samples) is deterministic across runs.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Maximum characters kept from a post's content.
pub const EXCERPT_CHARS: usize = 100;
/// Maximum excerpts stored per ticker in a history entry.
pub const SAMPLE_POSTS_CAP: usize = 3;
/// Maximum tickers attached to one insight.
pub const INSIGHT_TICKERS_CAP: usize = 5;

/// Source label used when a post doesn't carry one.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// source → (ticker → raw mention count), as produced by upstream fetchers.
pub type SourceTickerCounts = BTreeMap<String, BTreeMap<String, u64>>;

/// ticker → weighted mention total.
pub type CombinedCounts = BTreeMap<String, u64>;

/// source → (ticker → raw count), denylist applied.
pub type SourceBreakdown = BTreeMap<String, BTreeMap<String, u64>>;

/// ticker → everything the keyword-tagged posts said about it.
pub type SignalMap = BTreeMap<String, TickerSignals>;

/// A keyword-tagged post. Missing or `null` fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tickers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

impl Post {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tickers = tickers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Source label, or `"unknown"` when absent/blank.
    pub fn source_label(&self) -> &str {
        match self.source.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => UNKNOWN_SOURCE,
        }
    }
}

/// Per-ticker aggregate of keyword-tagged posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerSignals {
    /// Every keyword occurrence (duplicates kept; frequency feeds scoring).
    pub keywords: Vec<String>,
    /// Source label per contributing post (duplicates kept).
    pub sources: Vec<String>,
    /// Content excerpts, at most `EXCERPT_CHARS` characters each.
    pub posts: Vec<String>,
}

/// One ranked row of the aggregation output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredTicker {
    pub ticker: String,
    pub weighted_mentions: u64,
    pub narrative_score: u64,
    pub sources: Vec<String>,
}

/// A ticker seen on two or more sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossPlatformEntry {
    pub platforms: Vec<String>,
    pub mentions: u64,
    pub reach_score: u64,
}

/// Closed set of insight categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    CrossPlatformAlert,
    GenesisAlert,
    KeywordAlert,
}

impl InsightKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InsightKind::CrossPlatformAlert => "cross_platform_alert",
            InsightKind::GenesisAlert => "genesis_alert",
            InsightKind::KeywordAlert => "keyword_alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
    #[serde(default)]
    pub tickers: Vec<String>,
}

impl Insight {
    /// Builds an insight, keeping at most `INSIGHT_TICKERS_CAP` tickers.
    pub fn new(kind: InsightKind, message: impl Into<String>, tickers: Vec<String>) -> Self {
        let mut tickers = tickers;
        tickers.truncate(INSIGHT_TICKERS_CAP);
        Self {
            kind,
            message: message.into(),
            tickers,
        }
    }
}

/// Everything one `aggregate_all_sources` call hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub scored: Vec<ScoredTicker>,
    pub signals: SignalMap,
    pub insights: Vec<Insight>,
}

/// Normalize a ticker symbol: trim, drop a leading `$`, uppercase.
/// Returns `None` for blank input.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let t = raw.trim();
    let t = t.strip_prefix('$').unwrap_or(t).trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_ascii_uppercase())
    }
}

/// First `EXCERPT_CHARS` characters (not bytes) of `content`.
pub fn excerpt(content: &str) -> String {
    content.chars().take(EXCERPT_CHARS).collect()
}
