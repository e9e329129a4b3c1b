//! # Insight Generator
//! Turns one run's aggregates into a short list of categorical alerts.
//!
//! Rules are evaluated independently, in this order:
//! - **cross_platform_alert**: some ticker is on two or more sources.
//! - **genesis_alert**: tickers seen on early feeds (nostr, telegram) but not
//!   yet on mainstream ones (reddit, coingecko).
//! - **keyword_alert**: tickers whose posts carried enough narrative keywords.
//!
//! Each insight lists at most five tickers, strongest first.

use crate::denylist::Denylist;
use crate::model::{CombinedCounts, Insight, InsightKind, SignalMap, SourceBreakdown};
use crate::source_weights::{normalize, resolve_alias, SourceWeights};
use crate::trend::{ranked, TrendDetector};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_EARLY_SOURCES: [&str; 2] = ["nostr", "telegram"];
pub const DEFAULT_MAINSTREAM_SOURCES: [&str; 2] = ["reddit", "coingecko"];
/// Keyword occurrences (duplicates counted) needed for a keyword alert.
pub const DEFAULT_KEYWORD_ALERT_MIN: usize = 3;

#[derive(Debug, Clone)]
pub struct InsightGenerator {
    detector: TrendDetector,
    denylist: Denylist,
    early_sources: BTreeSet<String>,
    mainstream_sources: BTreeSet<String>,
    /// Source aliases, so "nostr.band" counts as nostr the same way it is weighted.
    aliases: BTreeMap<String, String>,
    keyword_alert_min: usize,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new(
            Denylist::default(),
            DEFAULT_EARLY_SOURCES,
            DEFAULT_MAINSTREAM_SOURCES,
            DEFAULT_KEYWORD_ALERT_MIN,
        )
        .with_aliases(&SourceWeights::default())
    }
}

impl InsightGenerator {
    pub fn new<E, M, S1, S2>(
        denylist: Denylist,
        early_sources: E,
        mainstream_sources: M,
        keyword_alert_min: usize,
    ) -> Self
    where
        E: IntoIterator<Item = S1>,
        M: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        Self {
            detector: TrendDetector::new(denylist.clone()),
            denylist,
            early_sources: early_sources.into_iter().map(|s| normalize(s.as_ref())).collect(),
            mainstream_sources: mainstream_sources
                .into_iter()
                .map(|s| normalize(s.as_ref()))
                .collect(),
            aliases: BTreeMap::new(),
            keyword_alert_min,
        }
    }

    /// Resolve source names through the alias table of `weights`.
    pub fn with_aliases(mut self, weights: &SourceWeights) -> Self {
        self.aliases = weights.aliases.clone();
        self
    }

    pub fn generate(
        &self,
        combined: &CombinedCounts,
        breakdown: &SourceBreakdown,
        signals: &SignalMap,
    ) -> Vec<Insight> {
        let mut out = Vec::new();

        if let Some(i) = self.cross_platform(breakdown) {
            out.push(i);
        }
        if let Some(i) = self.genesis(combined, breakdown) {
            out.push(i);
        }
        if let Some(i) = self.keyword(signals) {
            out.push(i);
        }

        out
    }

    fn cross_platform(&self, breakdown: &SourceBreakdown) -> Option<Insight> {
        let trends = self.detector.detect(breakdown);
        if trends.is_empty() {
            return None;
        }
        let tickers = ranked(&trends).into_iter().map(|(t, _)| t.clone()).collect();
        Some(Insight::new(
            InsightKind::CrossPlatformAlert,
            format!("{} tickers trending across multiple platforms", trends.len()),
            tickers,
        ))
    }

    fn genesis(&self, combined: &CombinedCounts, breakdown: &SourceBreakdown) -> Option<Insight> {
        let tickers_from = |set: &BTreeSet<String>| -> Option<BTreeSet<String>> {
            let mut found = false;
            let mut out = BTreeSet::new();
            for (source, per_source) in breakdown {
                if set.contains(&resolve_alias(&self.aliases, source)) {
                    found = true;
                    out.extend(per_source.keys().cloned());
                }
            }
            found.then_some(out)
        };

        let early = tickers_from(&self.early_sources)?;
        let mainstream = tickers_from(&self.mainstream_sources).unwrap_or_default();

        let mut genesis: Vec<String> = early
            .difference(&mainstream)
            .filter(|t| !self.denylist.contains(t))
            .cloned()
            .collect();
        if genesis.is_empty() {
            return None;
        }

        let weight_of = |t: &String| combined.get(t).copied().unwrap_or(0);
        genesis.sort_by(|a, b| weight_of(b).cmp(&weight_of(a)).then_with(|| a.cmp(b)));

        Some(Insight::new(
            InsightKind::GenesisAlert,
            format!(
                "{} tickers in genesis phase (early sources only)",
                genesis.len()
            ),
            genesis,
        ))
    }

    fn keyword(&self, signals: &SignalMap) -> Option<Insight> {
        let mut hot: Vec<(&String, usize)> = signals
            .iter()
            .map(|(t, s)| (t, s.keywords.len()))
            .filter(|(_, n)| *n >= self.keyword_alert_min)
            .collect();
        if hot.is_empty() {
            return None;
        }
        hot.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let count = hot.len();
        Some(Insight::new(
            InsightKind::KeywordAlert,
            format!("{count} tickers with strong narrative signals"),
            hot.into_iter().map(|(t, _)| t.clone()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TickerSignals;

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

    fn kinds(v: &[Insight]) -> Vec<InsightKind> {
        v.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn genesis_fires_for_early_only_ticker() {
        let g = InsightGenerator::default();
        let out = g.generate(
            &CombinedCounts::new(),
            &bd(&[("nostr", &[("ALPHA", 1)]), ("reddit", &[("BETA", 1)])]),
            &SignalMap::new(),
        );
        assert_eq!(kinds(&out), vec![InsightKind::GenesisAlert]);
        assert_eq!(out[0].tickers, vec!["ALPHA"]);
    }

    #[test]
    fn genesis_suppressed_once_mainstream_picks_it_up() {
        let g = InsightGenerator::default();
        let out = g.generate(
            &CombinedCounts::new(),
            &bd(&[("nostr", &[("ALPHA", 1)]), ("reddit", &[("ALPHA", 1), ("BETA", 1)])]),
            &SignalMap::new(),
        );
        assert!(out
            .iter()
            .filter(|i| i.kind == InsightKind::GenesisAlert)
            .all(|i| !i.tickers.contains(&"ALPHA".to_string())));
        assert_eq!(kinds(&out), vec![InsightKind::CrossPlatformAlert]);
    }

    #[test]
    fn aliased_early_source_counts_as_early() {
        let out = InsightGenerator::default().generate(
            &CombinedCounts::new(),
            &bd(&[("nostr.band", &[("ALPHA", 1)])]),
            &SignalMap::new(),
        );
        assert_eq!(kinds(&out), vec![InsightKind::GenesisAlert]);
        assert_eq!(out[0].tickers, vec!["ALPHA"]);
    }

    #[test]
    fn unknown_source_with_early_name_inside_is_not_early() {
        let out = InsightGenerator::default().generate(
            &CombinedCounts::new(),
            &bd(&[("nostrich_memes", &[("ALPHA", 1)])]),
            &SignalMap::new(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn genesis_needs_an_early_source() {
        let g = InsightGenerator::default();
        let out = g.generate(
            &CombinedCounts::new(),
            &bd(&[("farcaster", &[("ALPHA", 1)])]),
            &SignalMap::new(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn all_rules_in_order_with_capped_tickers() {
        let many: Vec<(String, u64)> = (0..7).map(|i| (format!("T{i}"), 1)).collect();
        let many_ref: Vec<(&str, u64)> = many.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        let breakdown = bd(&[("telegram", many_ref.as_slice()), ("farcaster", many_ref.as_slice())]);

        let mut signals = SignalMap::new();
        signals.insert(
            "T0".into(),
            TickerSignals {
                keywords: vec!["mint".into(); 3],
                ..TickerSignals::default()
            },
        );
        signals.insert(
            "T1".into(),
            TickerSignals {
                keywords: vec!["mint".into(); 2],
                ..TickerSignals::default()
            },
        );

        let out = InsightGenerator::default().generate(&CombinedCounts::new(), &breakdown, &signals);
        assert_eq!(
            kinds(&out),
            vec![
                InsightKind::CrossPlatformAlert,
                InsightKind::GenesisAlert,
                InsightKind::KeywordAlert
            ]
        );
        assert!(out[0].message.starts_with("7 "));
        assert_eq!(out[0].tickers.len(), 5);
        assert_eq!(out[1].tickers.len(), 5);
        assert_eq!(out[2].tickers, vec!["T0"]);
    }

    #[test]
    fn genesis_samples_strongest_first() {
        let mut combined = CombinedCounts::new();
        combined.insert("LOW".into(), 1);
        combined.insert("HIGH".into(), 30);
        let out = InsightGenerator::default().generate(
            &combined,
            &bd(&[("nostr", &[("LOW", 1), ("HIGH", 10)])]),
            &SignalMap::new(),
        );
        assert_eq!(out[0].tickers, vec!["HIGH", "LOW"]);
    }

    #[test]
    fn nothing_triggers_on_empty_input() {
        let out = InsightGenerator::default().generate(
            &CombinedCounts::new(),
            &SourceBreakdown::new(),
            &SignalMap::new(),
        );
        assert!(out.is_empty());
    }
}
