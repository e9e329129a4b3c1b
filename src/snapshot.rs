//! Input snapshot: what one scan collected from all feeds.
//!
//! JSON shape:
//! {
//!   "sources": { "nostr": { "ZAP": 3 }, "reddit": {} },
//!   "posts":   [ { "tickers": ["ZAP"], "keywords": ["airdrop"], "source": "nostr", "content": "..." } ],
//!   "texts":   [ { "source": "telegram", "text": "presale for $ABC opens" } ]
//! }
//!
//! `texts` go through `TextExtractor` and are merged into `sources`/`posts`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::extract::{RawText, TextExtractor};
use crate::model::{Post, SourceTickerCounts};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub sources: SourceTickerCounts,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub texts: Vec<RawText>,
}

impl Snapshot {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading snapshot from {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing snapshot {}", path.display()))
    }

    /// Pre-counted data plus whatever the raw texts yield.
    pub fn resolve(self, extractor: &TextExtractor) -> (SourceTickerCounts, Vec<Post>) {
        let Snapshot {
            mut sources,
            mut posts,
            texts,
        } = self;

        if texts.is_empty() {
            return (sources, posts);
        }

        let (extra_counts, extra_posts) = extractor.process(&texts);
        for (source, tickers) in extra_counts {
            let per_source = sources.entry(source).or_default();
            for (ticker, n) in tickers {
                let total = per_source.entry(ticker).or_insert(0);
                *total = total.saturating_add(n);
            }
        }
        posts.extend(extra_posts);

        (sources, posts)
    }
}
