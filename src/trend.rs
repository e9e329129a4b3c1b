//! Cross-platform trend detection over the raw per-source breakdown.

use crate::denylist::Denylist;
use crate::model::{CrossPlatformEntry, SourceBreakdown};
use std::collections::{BTreeMap, BTreeSet};

/// A ticker must appear on at least this many sources to count as a trend.
pub const MIN_PLATFORMS: usize = 2;

pub type CrossPlatformMap = BTreeMap<String, CrossPlatformEntry>;

#[derive(Debug, Clone, Default)]
pub struct TrendDetector {
    denylist: Denylist,
}

impl TrendDetector {
    pub fn new(denylist: Denylist) -> Self {
        Self { denylist }
    }

    /// Tickers present as a key in two or more sources' maps.
    pub fn detect(&self, breakdown: &SourceBreakdown) -> CrossPlatformMap {
        let candidates: BTreeSet<&String> =
            breakdown.values().flat_map(|per_source| per_source.keys()).collect();

        let mut out = CrossPlatformMap::new();
        for ticker in candidates {
            if self.denylist.contains(ticker) {
                continue;
            }

            let mut platforms = Vec::new();
            let mut mentions = 0u64;
            for (source, per_source) in breakdown {
                if let Some(&count) = per_source.get(ticker) {
                    platforms.push(source.clone());
                    mentions = mentions.saturating_add(count);
                }
            }

            if platforms.len() >= MIN_PLATFORMS {
                let reach_score = (platforms.len() as u64).saturating_mul(mentions);
                out.insert(
                    ticker.clone(),
                    CrossPlatformEntry {
                        platforms,
                        mentions,
                        reach_score,
                    },
                );
            }
        }
        out
    }
}

/// Entries ordered by descending reach, then ticker.
pub fn ranked(map: &CrossPlatformMap) -> Vec<(&String, &CrossPlatformEntry)> {
    let mut v: Vec<_> = map.iter().collect();
    v.sort_by(|a, b| b.1.reach_score.cmp(&a.1.reach_score).then_with(|| a.0.cmp(b.0)));
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bd(pairs: &[(&str, &[(&str, u64)])]) -> SourceBreakdown {
        pairs
            .iter()
            .map(|(s, t)| {
                (
                    s.to_string(),
                    t.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn two_sources_make_a_trend() {
        let out = TrendDetector::default().detect(&bd(&[
            ("reddit", &[("FOO", 2)]),
            ("nostr", &[("FOO", 3), ("SOLO", 9)]),
        ]));
        let foo = &out["FOO"];
        let mut platforms = foo.platforms.clone();
        platforms.sort();
        assert_eq!(platforms, vec!["nostr", "reddit"]);
        assert_eq!(foo.mentions, 5);
        assert_eq!(foo.reach_score, 10);
        assert!(!out.contains_key("SOLO"));
    }

    #[test]
    fn denylisted_tickers_are_ignored_even_if_present() {
        let out = TrendDetector::default().detect(&bd(&[
            ("reddit", &[("BTC", 2)]),
            ("nostr", &[("BTC", 3)]),
        ]));
        assert!(out.is_empty());
    }

    #[test]
    fn huge_mentions_saturate() {
        let out = TrendDetector::default().detect(&bd(&[
            ("reddit", &[("FOO", u64::MAX)]),
            ("farcaster", &[("FOO", 1)]),
        ]));
        assert_eq!(out["FOO"].mentions, u64::MAX);
        assert_eq!(out["FOO"].reach_score, u64::MAX);
    }

    #[test]
    fn ranking_by_reach_then_name() {
        let out = TrendDetector::new(Denylist::empty()).detect(&bd(&[
            ("a", &[("X", 1), ("Y", 5), ("Z", 1)]),
            ("b", &[("X", 1), ("Y", 5), ("Z", 1)]),
        ]));
        let order: Vec<&str> = ranked(&out).iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, vec!["Y", "X", "Z"]);
    }
}
