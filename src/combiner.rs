//! # Ticker Combiner
//! Merges per-source mention counts into one weighted total per ticker while
//! keeping the raw per-source breakdown for provenance and trend detection.
//! Pure: same input, same output.

use crate::denylist::Denylist;
use crate::model::{normalize_ticker, CombinedCounts, SourceBreakdown, SourceTickerCounts};
use crate::source_weights::SourceWeights;

#[derive(Debug, Clone, Default)]
pub struct TickerCombiner {
    weights: SourceWeights,
    denylist: Denylist,
}

impl TickerCombiner {
    pub fn new(weights: SourceWeights, denylist: Denylist) -> Self {
        Self { weights, denylist }
    }

    pub fn weights(&self) -> &SourceWeights {
        &self.weights
    }

    /// Returns `(weighted totals, raw per-source breakdown)`.
    ///
    /// Every source the caller supplied gets a breakdown entry, even when all
    /// of its tickers were denylisted; sources that weren't supplied never do.
    pub fn combine(&self, counts: &SourceTickerCounts) -> (CombinedCounts, SourceBreakdown) {
        let mut combined = CombinedCounts::new();
        let mut breakdown = SourceBreakdown::new();

        for (source, tickers) in counts {
            let weight = self.weights.weight_for(source);
            let per_source = breakdown.entry(source.clone()).or_default();

            for (raw, &count) in tickers {
                let Some(ticker) = normalize_ticker(raw) else {
                    continue;
                };
                if self.denylist.contains(&ticker) {
                    continue;
                }
                let raw_total = per_source.entry(ticker.clone()).or_insert(0);
                *raw_total = raw_total.saturating_add(count);
                let weighted = combined.entry(ticker).or_insert(0);
                *weighted = weighted.saturating_add(count.saturating_mul(weight));
            }
        }

        (combined, breakdown)
    }
}
