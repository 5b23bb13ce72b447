//! Cross-symbol summary statistics and rankings.
//!
//! Always recomputed from the result slice; nothing here is cached.

use crate::domain::analysis::AnalysisResult;
use crate::domain::signal::{Recommendation, MAX_SIGNALS};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryStatistics {
    pub total: usize,
    pub buy_count: usize,
    pub hold_count: usize,
    pub sell_count: usize,
    pub average_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub average_signal_count: Option<f64>,
    /// Mean of signal_count / 3.
    pub average_signal_ratio: Option<f64>,
    /// Mean over results that have a day change.
    pub average_day_change: Option<f64>,
}

impl SummaryStatistics {
    pub fn compute(results: &[AnalysisResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let total = results.len();
        let n = total as f64;
        let mut stats = Self {
            total,
            ..Self::default()
        };

        let mut price_sum = 0.0_f64;
        let mut min_price = f64::INFINITY;
        let mut max_price = f64::NEG_INFINITY;
        let mut signal_sum = 0usize;
        let mut change_sum = 0.0_f64;
        let mut change_count = 0usize;

        for r in results {
            match r.recommendation() {
                Recommendation::Buy => stats.buy_count += 1,
                Recommendation::Hold => stats.hold_count += 1,
                Recommendation::Sell => stats.sell_count += 1,
            }

            let price = r.price();
            price_sum += price;
            min_price = min_price.min(price);
            max_price = max_price.max(price);
            signal_sum += r.signal_count();

            if let Some(change) = r.day_change_percent {
                change_sum += change;
                change_count += 1;
            }
        }

        let average_signal_count = signal_sum as f64 / n;
        stats.average_price = Some(price_sum / n);
        stats.min_price = Some(min_price);
        stats.max_price = Some(max_price);
        stats.average_signal_count = Some(average_signal_count);
        stats.average_signal_ratio = Some(average_signal_count / MAX_SIGNALS as f64);
        stats.average_day_change = if change_count > 0 {
            Some(change_sum / change_count as f64)
        } else {
            None
        };
        stats
    }

    /// Share of `count` in the total, as a percentage.
    pub fn percent_of_total(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

/// Results by signal count descending; ties keep portfolio order.
pub fn top_picks(results: &[AnalysisResult]) -> Vec<&AnalysisResult> {
    let mut ranked: Vec<&AnalysisResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.signal_count().cmp(&a.signal_count()));
    ranked
}

/// Results with every signal active.
pub fn strong_buys(results: &[AnalysisResult]) -> Vec<&AnalysisResult> {
    results
        .iter()
        .filter(|r| r.signal_count() == MAX_SIGNALS)
        .collect()
}

/// Results with at most one active signal.
pub fn weakest(results: &[AnalysisResult]) -> Vec<&AnalysisResult> {
    results.iter().filter(|r| r.signal_count() <= 1).collect()
}
