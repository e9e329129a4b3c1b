//! Narrative score: volume + source diversity + keyword richness.
//!
//! ```text
//! score = combined
//!       + 5 × sources listing the ticker
//!       + 2 × keyword occurrences
//!       + 3 × high-value keyword occurrences
//! ```

use crate::model::{SignalMap, SourceBreakdown};
use std::collections::BTreeSet;

pub const SOURCE_DIVERSITY_POINTS: u64 = 5;
pub const KEYWORD_POINTS: u64 = 2;
pub const HIGH_VALUE_KEYWORD_POINTS: u64 = 3;

pub const DEFAULT_HIGH_VALUE_KEYWORDS: [&str; 4] = ["presale", "airdrop", "launch", "listing"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeScorer {
    high_value: BTreeSet<String>,
}

impl Default for NarrativeScorer {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_VALUE_KEYWORDS)
    }
}

impl NarrativeScorer {
    pub fn new<I, S>(high_value: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            high_value: high_value.into_iter().map(Into::into).collect(),
        }
    }

    pub fn score(
        &self,
        ticker: &str,
        combined_count: u64,
        breakdown: &SourceBreakdown,
        signals: &SignalMap,
    ) -> u64 {
        let source_count = breakdown
            .values()
            .filter(|per_source| per_source.contains_key(ticker))
            .count() as u64;

        let (keyword_count, high_value_count) = signals
            .get(ticker)
            .map(|s| {
                let hv = s
                    .keywords
                    .iter()
                    .filter(|k| self.high_value.contains(k.as_str()))
                    .count();
                (s.keywords.len() as u64, hv as u64)
            })
            .unwrap_or((0, 0));

        combined_count
            .saturating_add(SOURCE_DIVERSITY_POINTS.saturating_mul(source_count))
            .saturating_add(KEYWORD_POINTS.saturating_mul(keyword_count))
            .saturating_add(HIGH_VALUE_KEYWORD_POINTS.saturating_mul(high_value_count))
    }
}
