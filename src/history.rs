//! Bounded, append-only JSON log of aggregation snapshots.
//!
//! The on-disk file is a JSON array of entries, oldest first. Reads are
//! forgiving (missing or corrupt file → empty log); writes are atomic
//! (sibling temp file + rename) and their failures propagate.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{CombinedCounts, Insight, SignalMap, SourceBreakdown, SAMPLE_POSTS_CAP};

/// Entries kept on disk; older ones are dropped first.
pub const HISTORY_CAP: usize = 100;
pub const DEFAULT_HISTORY_PATH: &str = "crypto_tracking_history.json";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("serializing history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("writing history to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history lock poisoned")]
    Poisoned,
}

/// Compact per-ticker signal summary as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSignal {
    pub keyword_count: usize,
    pub sources: Vec<String>,
    pub sample_posts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// ISO-8601 UTC, e.g. "2026-10-14T09:30:00Z".
    pub timestamp: String,
    pub tickers: CombinedCounts,
    pub source_breakdown: SourceBreakdown,
    pub signals: BTreeMap<String, StoredSignal>,
    pub insights: Vec<Insight>,
}

impl HistoryEntry {
    pub fn new(
        timestamp: impl Into<String>,
        combined: &CombinedCounts,
        breakdown: &SourceBreakdown,
        signals: &SignalMap,
        insights: &[Insight],
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            tickers: combined.clone(),
            source_breakdown: breakdown.clone(),
            signals: compact_signals(signals),
            insights: insights.to_vec(),
        }
    }
}

/// keyword_count = all occurrences, sources deduplicated (first-seen order),
/// at most `SAMPLE_POSTS_CAP` excerpts.
pub fn compact_signals(signals: &SignalMap) -> BTreeMap<String, StoredSignal> {
    signals
        .iter()
        .map(|(ticker, s)| {
            let mut sources: Vec<String> = Vec::with_capacity(s.sources.len());
            for src in &s.sources {
                if !sources.contains(src) {
                    sources.push(src.clone());
                }
            }
            let stored = StoredSignal {
                keyword_count: s.keywords.len(),
                sources,
                sample_posts: s.posts.iter().take(SAMPLE_POSTS_CAP).cloned().collect(),
            };
            (ticker.clone(), stored)
        })
        .collect()
}

/// File-backed history. `append` holds an internal lock across the whole
/// load-modify-store cycle, so callers sharing one store never lose entries.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    cap: usize,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_capacity(path, HISTORY_CAP)
    }

    pub fn with_capacity(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap: cap.max(1),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Current log, oldest first. Never fails.
    pub fn load(&self) -> Vec<HistoryEntry> {
        read_log(&self.path)
    }

    /// Last `n` entries, oldest first.
    pub fn last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let mut v = self.load();
        let start = v.len().saturating_sub(n);
        v.drain(..start);
        v
    }

    /// Snapshot the run with the current UTC time and persist it.
    pub fn append(
        &self,
        combined: &CombinedCounts,
        breakdown: &SourceBreakdown,
        signals: &SignalMap,
        insights: &[Insight],
    ) -> Result<HistoryEntry, HistoryError> {
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let entry = HistoryEntry::new(ts, combined, breakdown, signals, insights);
        self.append_entry(entry.clone())?;
        Ok(entry)
    }

    /// Append a prebuilt entry, truncate to the cap, and rewrite the file.
    /// Returns the resulting log length.
    pub fn append_entry(&self, entry: HistoryEntry) -> Result<usize, HistoryError> {
        let _guard = self.lock.lock().map_err(|_| HistoryError::Poisoned)?;

        let mut log = read_log(&self.path);
        log.push(entry);
        if log.len() > self.cap {
            let excess = log.len() - self.cap;
            log.drain(0..excess);
        }

        let bytes = serde_json::to_vec_pretty(&log)?;
        write_atomic(&self.path, &bytes).map_err(|source| HistoryError::Write {
            path: self.path.clone(),
            source,
        })?;

        metrics::gauge!("history_entries").set(log.len() as f64);
        tracing::debug!(path = %self.path.display(), entries = log.len(), "history persisted");
        Ok(log.len())
    }
}

fn read_log(path: &Path) -> Vec<HistoryEntry> {
    let raw = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "history unreadable; starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_slice::<Vec<HistoryEntry>>(&raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "history corrupt; starting empty");
            Vec::new()
        }
    }
}

/// Write `bytes` to a sibling temp file, fsync it, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "history.json".into());
    // Unique per write, so stores sharing a path never share a temp file.
    static TMP_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    tmp_name.push(format!(".tmp{}.{seq}", std::process::id()));
    let tmp = path.with_file_name(tmp_name);

    let result = (|| -> io::Result<()> {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TickerSignals;

    fn entry(ts: &str) -> HistoryEntry {
        HistoryEntry::new(
            ts,
            &CombinedCounts::new(),
            &SourceBreakdown::new(),
            &SignalMap::new(),
            &[],
        )
    }

    #[test]
    fn compaction_dedups_sources_and_caps_samples() {
        let mut signals = SignalMap::new();
        signals.insert(
            "FOO".into(),
            TickerSignals {
                keywords: vec!["a".into(), "a".into(), "b".into()],
                sources: vec!["nostr".into(), "reddit".into(), "nostr".into()],
                posts: (0..5).map(|i| format!("p{i}")).collect(),
            },
        );
        let c = compact_signals(&signals);
        assert_eq!(c["FOO"].keyword_count, 3);
        assert_eq!(c["FOO"].sources, vec!["nostr", "reddit"]);
        assert_eq!(c["FOO"].sample_posts, vec!["p0", "p1", "p2"]);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nope.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty_and_is_replaced_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = HistoryStore::new(&path);
        assert!(store.load().is_empty());
        assert_eq!(store.append_entry(entry("t0")).unwrap(), 1);
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn cap_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::with_capacity(dir.path().join("h.json"), 3);
        for i in 0..4 {
            store.append_entry(entry(&format!("t{i}"))).unwrap();
        }
        let ts: Vec<String> = store.load().into_iter().map(|e| e.timestamp).collect();
        assert_eq!(ts, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.json"));
        store.append_entry(entry("t0")).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("h.json")]);
    }

    #[test]
    fn write_failure_propagates_and_keeps_old_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("h.json");
        fs::create_dir_all(path.join("blocker")).unwrap();
        let store = HistoryStore::new(&path);
        let err = store.append_entry(entry("t0")).unwrap_err();
        assert!(matches!(err, HistoryError::Write { .. }));
        assert!(path.join("blocker").is_dir());
    }
}
