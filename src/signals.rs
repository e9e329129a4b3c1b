//! Signal extraction: groups keyword-tagged posts by ticker.

use crate::denylist::Denylist;
use crate::model::{excerpt, normalize_ticker, Post, SignalMap};

#[derive(Debug, Clone, Default)]
pub struct SignalExtractor {
    denylist: Denylist,
}

impl SignalExtractor {
    pub fn new(denylist: Denylist) -> Self {
        Self { denylist }
    }

    /// A post tagged with several tickers contributes in full to each of them.
    pub fn extract(&self, posts: &[Post]) -> SignalMap {
        let mut signals = SignalMap::new();

        for post in posts {
            let source = post.source_label();
            let snippet = excerpt(&post.content);

            for raw in &post.tickers {
                let Some(ticker) = normalize_ticker(raw) else {
                    continue;
                };
                if self.denylist.contains(&ticker) {
                    continue;
                }
                let entry = signals.entry(ticker).or_default();
                entry.keywords.extend(post.keywords.iter().cloned());
                entry.sources.push(source.to_string());
                entry.posts.push(snippet.clone());
            }
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_ticker_post_counts_for_each_ticker() {
        let posts = vec![Post::new("telegram", "presale live for $AAA and $BBB")
            .with_tickers(["AAA", "BBB"])
            .with_keywords(["presale", "launch"])];
        let s = SignalExtractor::default().extract(&posts);
        assert_eq!(s["AAA"], s["BBB"]);
        assert_eq!(s["AAA"].keywords, vec!["presale", "launch"]);
        assert_eq!(s["AAA"].sources, vec!["telegram"]);
    }

    #[test]
    fn keywords_and_sources_keep_duplicates() {
        let posts = vec![
            Post::new("nostr", "a").with_tickers(["FOO"]).with_keywords(["airdrop"]),
            Post::new("nostr", "b").with_tickers(["FOO"]).with_keywords(["airdrop"]),
        ];
        let s = SignalExtractor::default().extract(&posts);
        assert_eq!(s["FOO"].keywords.len(), 2);
        assert_eq!(s["FOO"].sources, vec!["nostr", "nostr"]);
        assert_eq!(s["FOO"].posts, vec!["a", "b"]);
    }

    #[test]
    fn missing_source_defaults_to_unknown_and_content_is_truncated() {
        let post = Post {
            tickers: vec!["FOO".into()],
            content: "x".repeat(250),
            ..Post::default()
        };
        let s = SignalExtractor::default().extract(&[post]);
        assert_eq!(s["FOO"].sources, vec!["unknown"]);
        assert_eq!(s["FOO"].posts[0].len(), 100);
    }

    #[test]
    fn denylisted_tickers_are_skipped() {
        let posts = vec![Post::new("reddit", "btc airdrop")
            .with_tickers(["BTC", "NEWT"])
            .with_keywords(["airdrop"])];
        let s = SignalExtractor::default().extract(&posts);
        assert!(!s.contains_key("BTC"));
        assert!(s.contains_key("NEWT"));
    }

    #[test]
    fn post_without_tickers_contributes_nothing() {
        let posts = vec![Post::new("reddit", "launch soon").with_keywords(["launch"])];
        assert!(SignalExtractor::default().extract(&posts).is_empty());
    }
}
