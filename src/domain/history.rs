//! Read-back of previously recorded sheet rows.
//!
//! Rows are kept as the text that was written. A sheet may have been edited
//! by hand, so nothing here re-parses prices or recommendations.

use std::collections::BTreeMap;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
/// Rows considered by the recommendation summary.
pub const SUMMARY_ROWS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub timestamp: String,
    pub symbol: String,
    pub company: String,
    pub price: String,
    pub signals: String,
    pub recommendation: String,
    pub change_percent: String,
    pub analysis_type: String,
}

/// Keep rows for `symbol` (case-insensitive, all rows when `None`), then the
/// trailing `limit` of those in recorded order.
pub fn select_history(
    rows: Vec<HistoryRow>,
    symbol: Option<&str>,
    limit: usize,
) -> Vec<HistoryRow> {
    let wanted = symbol.map(|s| s.trim().to_uppercase());
    let mut selected: Vec<HistoryRow> = rows
        .into_iter()
        .filter(|row| match &wanted {
            Some(s) => row.symbol.trim().eq_ignore_ascii_case(s),
            None => true,
        })
        .collect();
    let skip = selected.len().saturating_sub(limit);
    selected.drain(..skip);
    selected
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistorySummary {
    pub total: usize,
    /// Row count per recommendation label, sorted by label.
    pub recommendations: BTreeMap<String, usize>,
    pub last: Option<HistoryRow>,
}

impl HistorySummary {
    pub fn compute(rows: &[HistoryRow]) -> Self {
        let mut recommendations = BTreeMap::new();
        for row in rows {
            *recommendations
                .entry(row.recommendation.trim().to_string())
                .or_insert(0) += 1;
        }
        Self {
            total: rows.len(),
            recommendations,
            last: rows.last().cloned(),
        }
    }
}
