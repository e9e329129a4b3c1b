// src/config/tracker.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::denylist::{Denylist, DEFAULT_MAJORS};
use crate::engine::NarrativeEngine;
use crate::extract::{TextExtractor, DEFAULT_COMMON_SYMBOLS, DEFAULT_NARRATIVE_KEYWORDS};
use crate::history::{HistoryStore, DEFAULT_HISTORY_PATH, HISTORY_CAP};
use crate::insights::{
    DEFAULT_EARLY_SOURCES, DEFAULT_KEYWORD_ALERT_MIN, DEFAULT_MAINSTREAM_SOURCES,
};
use crate::scoring::DEFAULT_HIGH_VALUE_KEYWORDS;
use crate::source_weights::{normalize, SourceWeights};

pub const ENV_TRACKER_CONFIG_PATH: &str = "TRACKER_CONFIG_PATH";
pub const DEFAULT_TRACKER_CONFIG_PATH: &str = "config/tracker.toml";

fn strings<const N: usize>(v: [&str; N]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn default_history_path() -> PathBuf {
    PathBuf::from(DEFAULT_HISTORY_PATH)
}
fn default_history_cap() -> usize {
    HISTORY_CAP
}
fn default_keyword_alert_min() -> usize {
    DEFAULT_KEYWORD_ALERT_MIN
}
fn default_denylist() -> Vec<String> {
    strings(DEFAULT_MAJORS)
}
fn default_early() -> Vec<String> {
    strings(DEFAULT_EARLY_SOURCES)
}
fn default_mainstream() -> Vec<String> {
    strings(DEFAULT_MAINSTREAM_SOURCES)
}
fn default_high_value() -> Vec<String> {
    strings(DEFAULT_HIGH_VALUE_KEYWORDS)
}
fn default_narrative_keywords() -> Vec<String> {
    strings(DEFAULT_NARRATIVE_KEYWORDS)
}
fn default_common_symbols() -> Vec<String> {
    strings(DEFAULT_COMMON_SYMBOLS)
}

/// Everything tunable about a tracker run. Every field has a default, so an
/// empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    #[serde(default)]
    pub source_weights: SourceWeights,
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
    #[serde(default = "default_early")]
    pub early_sources: Vec<String>,
    #[serde(default = "default_mainstream")]
    pub mainstream_sources: Vec<String>,
    #[serde(default = "default_high_value")]
    pub high_value_keywords: Vec<String>,
    #[serde(default = "default_narrative_keywords")]
    pub narrative_keywords: Vec<String>,
    #[serde(default = "default_common_symbols")]
    pub common_symbols: Vec<String>,
    #[serde(default = "default_keyword_alert_min")]
    pub keyword_alert_min: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            history_cap: default_history_cap(),
            source_weights: SourceWeights::default(),
            denylist: default_denylist(),
            early_sources: default_early(),
            mainstream_sources: default_mainstream(),
            high_value_keywords: default_high_value(),
            narrative_keywords: default_narrative_keywords(),
            common_symbols: default_common_symbols(),
            keyword_alert_min: default_keyword_alert_min(),
        }
    }
}

impl TrackerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: TrackerConfig = toml::from_str(s).context("parsing tracker config")?;
        Ok(cfg.sanitized())
    }

    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading tracker config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $TRACKER_CONFIG_PATH
    /// 2) config/tracker.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_TRACKER_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("TRACKER_CONFIG_PATH points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_TRACKER_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    pub fn denylist(&self) -> Denylist {
        Denylist::new(&self.denylist)
    }

    pub fn engine(&self) -> NarrativeEngine {
        NarrativeEngine::from_config(self)
    }

    pub fn text_extractor(&self) -> TextExtractor {
        TextExtractor::new(&self.narrative_keywords, &self.common_symbols)
    }

    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::with_capacity(&self.history_path, self.history_cap)
    }

    /// Normalize weight keys so lookups stay case-insensitive; floor the cap at 1.
    fn sanitized(mut self) -> Self {
        let sw = &mut self.source_weights;
        sw.weights = std::mem::take(&mut sw.weights)
            .into_iter()
            .map(|(k, v)| (normalize(&k), v))
            .collect();
        sw.aliases = std::mem::take(&mut sw.aliases)
            .into_iter()
            .map(|(k, v)| (normalize(&k), normalize(&v)))
            .collect();
        self.history_cap = self.history_cap.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg = TrackerConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, TrackerConfig::default());
        assert_eq!(cfg.history_cap, 100);
        assert_eq!(cfg.source_weights.weight_for("nostr"), 3);
    }

    #[test]
    fn overrides_and_key_normalization() {
        let cfg = TrackerConfig::from_toml_str(
            r#"
history_cap = 0
denylist = ["PEPE"]

[source_weights]
default_weight = 2

[source_weights.weights]
Reddit = 7
"#,
        )
        .unwrap();
        assert_eq!(cfg.history_cap, 1);
        assert!(cfg.denylist().contains("pepe"));
        assert!(!cfg.denylist().contains("BTC"));
        assert_eq!(cfg.source_weights.weight_for("reddit"), 7);
        assert_eq!(cfg.source_weights.weight_for("nostr"), 2);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(TrackerConfig::from_toml_str("history_cap = \"many\"").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_TRACKER_CONFIG_PATH);

        // No files → defaults
        assert_eq!(TrackerConfig::load_default().unwrap(), TrackerConfig::default());

        // Env wins
        let p = tmp.path().join("custom.toml");
        fs::write(&p, "keyword_alert_min = 9").unwrap();
        env::set_var(ENV_TRACKER_CONFIG_PATH, p.display().to_string());
        assert_eq!(TrackerConfig::load_default().unwrap().keyword_alert_min, 9);

        // Env pointing nowhere → error
        env::set_var(ENV_TRACKER_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(TrackerConfig::load_default().is_err());
        env::remove_var(ENV_TRACKER_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
