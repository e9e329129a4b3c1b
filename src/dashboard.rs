//! Dashboard view over the history log: latest scan, scan-over-scan trends,
//! and top movers.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::history::HistoryEntry;
use crate::model::Insight;

pub const TOP_TICKERS: usize = 20;
pub const TOP_MOVERS: usize = 5;

/// Change of one ticker between the last two scans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerTrend {
    pub change: i64,
    pub previous: u64,
    pub is_new: bool,
    /// Percent change; 100 for tickers absent from the previous scan.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardTicker {
    pub symbol: String,
    pub count: u64,
    pub change: i64,
    pub is_new: bool,
    pub previous: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mover {
    pub ticker: String,
    pub change: i64,
    pub previous: u64,
    pub current: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub last_update: Option<String>,
    pub scans_count: usize,
    pub total_tickers: usize,
    pub total_mentions: u64,
    pub max_mentions: u64,
    pub top_tickers: Vec<DashboardTicker>,
    pub movers: Vec<Mover>,
    pub insights: Vec<Insight>,
}

/// Per-ticker trend of the newest scan against the one before it.
/// Empty until at least two scans exist.
pub fn calculate_trends(history: &[HistoryEntry]) -> BTreeMap<String, TickerTrend> {
    let [.., previous, current] = history else {
        return BTreeMap::new();
    };

    current
        .tickers
        .iter()
        .map(|(ticker, &count)| {
            let prev = previous.tickers.get(ticker).copied().unwrap_or(0);
            let diff = i128::from(count) - i128::from(prev);
            let change = diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
            let percent = if prev > 0 {
                diff as f64 / prev as f64 * 100.0
            } else {
                100.0
            };
            (
                ticker.clone(),
                TickerTrend {
                    change,
                    previous: prev,
                    is_new: prev == 0,
                    percent,
                },
            )
        })
        .collect()
}

pub fn build_dashboard(history: &[HistoryEntry]) -> Dashboard {
    let Some(latest) = history.last() else {
        return Dashboard {
            last_update: None,
            scans_count: 0,
            total_tickers: 0,
            total_mentions: 0,
            max_mentions: 0,
            top_tickers: Vec::new(),
            movers: Vec::new(),
            insights: Vec::new(),
        };
    };

    let trends = calculate_trends(history);

    let mut sorted: Vec<(&String, u64)> = latest.tickers.iter().map(|(t, &c)| (t, c)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    let top_tickers: Vec<DashboardTicker> = sorted
        .iter()
        .take(TOP_TICKERS)
        .map(|(symbol, count)| {
            let trend = trends.get(*symbol);
            DashboardTicker {
                symbol: (*symbol).clone(),
                count: *count,
                change: trend.map_or(0, |t| t.change),
                is_new: trend.is_some_and(|t| t.is_new),
                previous: trend.map_or(0, |t| t.previous),
            }
        })
        .collect();

    let mut movers: Vec<Mover> = top_tickers
        .iter()
        .filter(|t| t.change > 0)
        .map(|t| Mover {
            ticker: t.symbol.clone(),
            change: t.change,
            previous: t.previous,
            current: t.count,
        })
        .collect();
    movers.sort_by(|a, b| b.change.cmp(&a.change));
    movers.truncate(TOP_MOVERS);

    Dashboard {
        last_update: Some(latest.timestamp.clone()),
        scans_count: history.len(),
        total_tickers: latest.tickers.len(),
        total_mentions: latest
            .tickers
            .values()
            .fold(0u64, |acc, &c| acc.saturating_add(c)),
        max_mentions: sorted.first().map_or(0, |(_, c)| *c),
        top_tickers,
        movers,
        insights: latest.insights.clone(),
    }
}
