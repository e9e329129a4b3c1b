//! Majors denylist: large caps that drown out emerging narratives and are
//! excluded at every ingestion point.

use serde::Deserialize;
use std::collections::BTreeSet;

/// Well-known majors excluded by default.
pub const DEFAULT_MAJORS: [&str; 20] = [
    "BTC", "ETH", "SOL", "BNB", "XRP", "ADA", "DOGE", "AVAX", "DOT", "MATIC", "LINK", "UNI", "LTC",
    "ATOM", "XLM", "ALGO", "VET", "FIL", "NEAR", "ARB",
];

/// Immutable set of excluded ticker symbols (stored uppercase).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct Denylist {
    symbols: BTreeSet<String>,
}

impl Denylist {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            symbols: symbols
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            symbols: BTreeSet::new(),
        }
    }

    /// Case-insensitive membership.
    pub fn contains(&self, ticker: &str) -> bool {
        self.symbols.contains(&ticker.trim().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for Denylist {
    fn default() -> Self {
        Self::new(DEFAULT_MAJORS)
    }
}

impl From<Vec<String>> for Denylist {
    fn from(v: Vec<String>) -> Self {
        Self::new(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contains_majors_case_insensitive() {
        let d = Denylist::default();
        assert_eq!(d.len(), 20);
        assert!(d.contains("BTC"));
        assert!(d.contains("eth"));
        assert!(!d.contains("PEPE"));
    }

    #[test]
    fn custom_list_replaces_defaults() {
        let d = Denylist::new(["pepe", " ", "WIF"]);
        assert_eq!(d.len(), 2);
        assert!(d.contains("PEPE"));
        assert!(!d.contains("BTC"));
    }
}
