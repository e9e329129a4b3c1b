//! Plain-text scan report for terminals.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::model::{AggregationResult, InsightKind, SignalMap};

pub const REPORT_ROWS: usize = 20;
pub const ROW_KEYWORDS: usize = 3;
pub const SUMMARY_KEYWORDS: usize = 10;
pub const SUMMARY_TICKERS: usize = 5;

const RULE_WIDTH: usize = 70;

/// One line of the keyword summary: how often a keyword was seen and on which tickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSummary {
    pub keyword: String,
    pub mentions: usize,
    pub tickers: Vec<String>,
}

/// Keywords by descending occurrence count (ties by keyword), at most
/// `SUMMARY_KEYWORDS`, each with up to `SUMMARY_TICKERS` distinct tickers.
pub fn keyword_summary(signals: &SignalMap) -> Vec<KeywordSummary> {
    let mut by_kw: BTreeMap<&str, (usize, Vec<&str>)> = BTreeMap::new();
    for (ticker, sig) in signals {
        for kw in &sig.keywords {
            let (n, tickers) = by_kw.entry(kw.as_str()).or_default();
            *n += 1;
            if !tickers.contains(&ticker.as_str()) {
                tickers.push(ticker.as_str());
            }
        }
    }

    let mut rows: Vec<KeywordSummary> = by_kw
        .into_iter()
        .map(|(kw, (mentions, tickers))| KeywordSummary {
            keyword: kw.to_string(),
            mentions,
            tickers: tickers
                .into_iter()
                .take(SUMMARY_TICKERS)
                .map(str::to_string)
                .collect(),
        })
        .collect();
    rows.sort_by(|a, b| b.mentions.cmp(&a.mentions).then_with(|| a.keyword.cmp(&b.keyword)));
    rows.truncate(SUMMARY_KEYWORDS);
    rows
}

fn distinct_keywords(signals: &SignalMap, ticker: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if let Some(sig) = signals.get(ticker) {
        for kw in &sig.keywords {
            if out.len() == ROW_KEYWORDS {
                break;
            }
            if !out.contains(kw) {
                out.push(kw.clone());
            }
        }
    }
    out
}

fn cashtags(tickers: &[String]) -> String {
    tickers
        .iter()
        .map(|t| format!("${t}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_report(result: &AggregationResult) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = writeln!(out, "{rule}\nTOP {REPORT_ROWS} EMERGING NARRATIVES\n{rule}");

    if result.scored.is_empty() {
        let _ = writeln!(out, "\n  No data found.");
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:<6} {:<10} {:<8} {:<30} Signals",
        "Rank", "Ticker", "Score", "Sources"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for (i, row) in result.scored.iter().take(REPORT_ROWS).enumerate() {
        let kws = distinct_keywords(&result.signals, &row.ticker);
        let kws = if kws.is_empty() {
            "-".to_string()
        } else {
            kws.join(", ")
        };
        let _ = writeln!(
            out,
            "{:<6} ${:<9} {:<8} {:<30} {}",
            i + 1,
            row.ticker,
            row.narrative_score,
            row.sources.join(", "),
            kws
        );
    }

    if !result.insights.is_empty() {
        let _ = writeln!(out, "\n{rule}\nKEY INSIGHTS\n{rule}");
        for ins in &result.insights {
            let _ = writeln!(out, "\n{}", ins.message);
            if !ins.tickers.is_empty() {
                let _ = writeln!(out, "  -> {}", cashtags(&ins.tickers));
            }
        }
    }

    let _ = writeln!(out, "\n{rule}\nNARRATIVE ALERTS\n{rule}");
    for row in keyword_summary(&result.signals) {
        let _ = writeln!(
            out,
            "\n'{}' - {} mentions\n  Tickers: {}",
            row.keyword.to_uppercase(),
            row.mentions,
            cashtags(&row.tickers)
        );
    }

    let count_of = |kind: InsightKind| result.insights.iter().filter(|i| i.kind == kind).count();
    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "Total tickers tracked: {}", result.scored.len());
    let _ = writeln!(
        out,
        "Cross-platform signals: {}",
        count_of(InsightKind::CrossPlatformAlert)
    );
    let _ = writeln!(
        out,
        "Genesis phase detections: {}",
        count_of(InsightKind::GenesisAlert)
    );
    let _ = writeln!(out, "{rule}");
    out
}
