// src/extract.rs
//! Raw text → mention counts and keyword-tagged posts.
//!
//! Upstream fetchers hand over `(source, text)` items; this module finds the
//! tickers and narrative keywords in them so the aggregation pipeline can run
//! on plain text dumps as well as on pre-counted data.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{excerpt, Post, SourceTickerCounts};

/// Narrative keywords watched across all feeds.
pub const DEFAULT_NARRATIVE_KEYWORDS: [&str; 22] = [
    "airdrop",
    "presale",
    "launch",
    "launched",
    "launching",
    "new coin",
    "new token",
    "fair launch",
    "stealth launch",
    "ido",
    "ico",
    "listing",
    "whitelist",
    "mint",
    "minting",
    "alpha",
    "early",
    "testnet",
    "mainnet",
    "announcement",
    "release",
    "drop",
];

/// Bare words (no `$`) accepted as tickers.
pub const DEFAULT_COMMON_SYMBOLS: [&str; 14] = [
    "BTC", "ETH", "SOL", "BNB", "XRP", "ADA", "DOGE", "AVAX", "DOT", "MATIC", "SATS", "ORDI",
    "BASE", "WARP",
];

/// One raw item from a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawText {
    pub source: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TextExtractor {
    keywords: Vec<String>,
    common_symbols: BTreeSet<String>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_NARRATIVE_KEYWORDS, DEFAULT_COMMON_SYMBOLS)
    }
}

fn cashtag_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\$([A-Z]{2,10})\b").expect("cashtag regex"))
}

fn bare_word_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z]{3,6})\b").expect("bare word regex"))
}

impl TextExtractor {
    pub fn new<K, C, S1, S2>(keywords: K, common_symbols: C) -> Self
    where
        K: IntoIterator<Item = S1>,
        C: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            common_symbols: common_symbols
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_uppercase())
                .collect(),
        }
    }

    /// Distinct tickers in `text`: any `$CASHTAG`, plus bare 3–6 letter words
    /// that are known symbols. Output is sorted.
    pub fn extract_tickers(&self, text: &str) -> Vec<String> {
        let text = normalize_text(text).to_uppercase();
        let mut found = BTreeSet::new();

        for cap in cashtag_re().captures_iter(&text) {
            found.insert(cap[1].to_string());
        }
        for cap in bare_word_re().captures_iter(&text) {
            if self.common_symbols.contains(&cap[1]) {
                found.insert(cap[1].to_string());
            }
        }

        found.into_iter().collect()
    }

    /// Watched keywords occurring (case-insensitive substring) in `text`.
    pub fn detect_keywords(&self, text: &str) -> Vec<String> {
        let lower = normalize_text(text).to_lowercase();
        self.keywords
            .iter()
            .filter(|k| lower.contains(k.as_str()))
            .cloned()
            .collect()
    }

    /// Count mentions per source and collect keyword-tagged posts.
    /// Each text counts a ticker at most once.
    pub fn process(&self, items: &[RawText]) -> (SourceTickerCounts, Vec<Post>) {
        let mut counts = SourceTickerCounts::new();
        let mut posts = Vec::new();

        for item in items {
            let tickers = self.extract_tickers(&item.text);
            let per_source = counts.entry(item.source.clone()).or_default();
            for t in &tickers {
                *per_source.entry(t.clone()).or_insert(0) += 1;
            }

            let keywords = self.detect_keywords(&item.text);
            if !keywords.is_empty() {
                posts.push(
                    Post::new(item.source.clone(), excerpt(&normalize_text(&item.text)))
                        .with_tickers(tickers)
                        .with_keywords(keywords),
                );
            }
        }

        (counts, posts)
    }
}

/// Decode HTML entities, strip tags and collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();

    let decoded = html_escape::decode_html_entities(s).to_string();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    let stripped = re_tags.replace_all(&decoded, " ");
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cashtags_and_known_bare_symbols() {
        let x = TextExtractor::default();
        let t = x.extract_tickers("aping into $pepe and $WIF, skip eth, also HODL");
        assert_eq!(t, vec!["ETH", "PEPE", "WIF"]);
    }

    #[test]
    fn single_letter_cashtag_is_ignored() {
        let x = TextExtractor::default();
        assert!(x.extract_tickers("$X to the moon").is_empty());
    }

    #[test]
    fn keywords_are_substring_matches() {
        let x = TextExtractor::default();
        let k = x.detect_keywords("Fair Launch tomorrow, whitelist open");
        assert!(k.contains(&"launch".to_string()));
        assert!(k.contains(&"fair launch".to_string()));
        assert!(k.contains(&"whitelist".to_string()));
    }

    #[test]
    fn process_counts_once_per_text_and_tags_posts() {
        let x = TextExtractor::default();
        let items = vec![
            RawText {
                source: "nostr".into(),
                text: "$ZAP $ZAP airdrop live".into(),
            },
            RawText {
                source: "nostr".into(),
                text: "gm $ZAP".into(),
            },
        ];
        let (counts, posts) = x.process(&items);
        assert_eq!(counts["nostr"]["ZAP"], 2);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].tickers, vec!["ZAP"]);
        // "drop" is a substring of "airdrop", so both are tagged
        assert_eq!(posts[0].keywords, vec!["airdrop", "drop"]);
        assert_eq!(posts[0].source_label(), "nostr");
    }

    #[test]
    fn normalize_decodes_entities_and_tags() {
        assert_eq!(normalize_text("<p>new&nbsp;coin</p>\n\n$ABC"), "new coin $ABC");
    }
}
