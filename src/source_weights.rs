//! # Source Weights
//!
//! Integer trust/priority weights per data source (e.g. "nostr", "reddit").
//! Earlier, narrower feeds get larger weights because a mention there tends
//! to precede mainstream pickup.
//!
//! - Case-insensitive lookup with normalization of punctuation, dashes, etc.
//! - Aliases map alternative spellings to canonical sources.
//! - Fallback order: aliases → exact match → default (1). A source absent
//!   from the table never borrows another source's weight.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Weight applied to sources missing from the table.
pub const DEFAULT_SOURCE_WEIGHT: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceWeights {
    /// Default weight if no match is found.
    #[serde(default = "default_weight")]
    pub default_weight: u64,
    /// Explicit weights for canonical source names.
    #[serde(default)]
    pub weights: BTreeMap<String, u64>,
    /// Aliases mapping non-canonical names → canonical names.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_weight() -> u64 {
    DEFAULT_SOURCE_WEIGHT
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl SourceWeights {
    /// Table with only the given weights and the standard default of 1.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        Self {
            default_weight: DEFAULT_SOURCE_WEIGHT,
            weights: pairs
                .into_iter()
                .map(|(k, v)| (normalize(k), v))
                .collect(),
            aliases: BTreeMap::new(),
        }
    }

    /// Canonical name of `source`: normalized, with aliases resolved.
    pub fn canonical(&self, source: &str) -> String {
        resolve_alias(&self.aliases, source)
    }

    /// Get the weight for a given source name.
    pub fn weight_for(&self, source: &str) -> u64 {
        self.weights
            .get(&self.canonical(source))
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// Built-in table for the five tracked feeds.
    pub(crate) fn default_seed() -> Self {
        let mut seed = Self::from_pairs([
            ("nostr", 3),
            ("telegram", 3),
            ("farcaster", 2),
            ("reddit", 1),
            ("coingecko", 1),
        ]);

        for (a, c) in [
            ("nostr band", "nostr"),
            ("tg", "telegram"),
            ("warpcast", "farcaster"),
            ("subreddit", "reddit"),
            ("cg", "coingecko"),
        ] {
            seed.aliases.insert(a.to_string(), c.to_string());
        }
        seed
    }
}

/// Normalize `source` and map it through `aliases` (keys already normalized).
pub fn resolve_alias(aliases: &BTreeMap<String, String>, source: &str) -> String {
    let s = normalize(source);
    match aliases.get(&s) {
        Some(canon) => normalize(canon),
        None => s,
    }
}

/// Lowercase, turn separators into spaces, collapse whitespace.
pub(crate) fn normalize(s: &str) -> String {
    let mut out = s.trim().to_ascii_lowercase();
    out = out.replace(['—', '–', '-', '_', '/', '\\', '.', ','], " ");
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SourceWeights {
        SourceWeights::default_seed()
    }

    #[test]
    fn exact_match() {
        assert_eq!(cfg().weight_for("nostr"), 3);
        assert_eq!(cfg().weight_for("farcaster"), 2);
    }

    #[test]
    fn alias_match() {
        assert_eq!(cfg().weight_for("Warpcast"), 2);
        assert_eq!(cfg().weight_for("nostr.band"), 3);
    }

    #[test]
    fn names_containing_a_known_source_are_still_unknown() {
        assert_eq!(cfg().weight_for("nostrich_memes"), DEFAULT_SOURCE_WEIGHT);
        assert_eq!(cfg().weight_for("telegram-alpha-calls"), DEFAULT_SOURCE_WEIGHT);
    }

    #[test]
    fn canonical_resolves_aliases() {
        assert_eq!(cfg().canonical("Nostr.Band"), "nostr");
        assert_eq!(cfg().canonical("TG"), "telegram");
        assert_eq!(cfg().canonical("randomsrc"), "randomsrc");
    }

    #[test]
    fn unknown_source_gets_default() {
        assert_eq!(cfg().weight_for("randomsrc"), DEFAULT_SOURCE_WEIGHT);
    }

    #[test]
    fn case_insensitive_lookup() {
        let c = cfg();
        assert_eq!(c.weight_for("NOSTR"), c.weight_for("nostr"));
    }
}
