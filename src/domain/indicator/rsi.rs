//! RSI (Relative Strength Index), simple-average variant.
//!
//! Average gain/loss are plain means of the last n close-to-close changes
//! (no Wilder smoothing):
//!   RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100. If both are zero the value is
//! undefined and the point is marked invalid.
//!
//! Warmup: first n bars are invalid (n changes need n + 1 closes).
//! Informational only; never feeds the buy/sell decision.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Rsi(period));
    }

    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            // change j is between bar j and bar j + 1
            let rsi = if i >= period {
                rsi_from_changes(&changes[i - period..i])
            } else {
                None
            };
            IndicatorPoint {
                date: bar.date,
                valid: rsi.is_some(),
                value: rsi.unwrap_or(0.0),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_changes(window: &[f64]) -> Option<f64> {
    let n = window.len() as f64;
    let avg_gain = window.iter().filter(|c| **c > 0.0).sum::<f64>() / n;
    let avg_loss = window.iter().filter(|c| **c < 0.0).map(|c| -c).sum::<f64>() / n;

    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { Some(100.0) } else { None };
    }
    Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn rsi_warmup() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 11.0, 12.0]);
        let series = calculate_rsi(&bars, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(!series.values[2].valid);
        assert!(series.values[3].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        let series = calculate_rsi(&bars, 3);
        assert_eq!(series.latest_value(), Some(100.0));
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let bars = make_bars(&[13.0, 12.0, 11.0, 10.0]);
        let series = calculate_rsi(&bars, 3);
        let v = series.latest_value().unwrap();
        assert!(v.abs() < 1e-10);
    }

    #[test]
    fn rsi_flat_is_undefined() {
        let bars = make_bars(&[10.0, 10.0, 10.0, 10.0]);
        let series = calculate_rsi(&bars, 3);
        assert_eq!(series.latest_value(), None);
    }

    #[test]
    fn rsi_known_value() {
        // changes: +2, -1, +1 → avg_gain = 1, avg_loss = 1/3, rs = 3 → 75
        let bars = make_bars(&[10.0, 12.0, 11.0, 12.0]);
        let series = calculate_rsi(&bars, 3);
        let v = series.latest_value().unwrap();
        assert!((v - 75.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_uses_only_trailing_window() {
        // first change (-5) falls out of the 2-change window
        let bars = make_bars(&[15.0, 10.0, 11.0, 12.0]);
        let series = calculate_rsi(&bars, 2);
        assert_eq!(series.latest_value(), Some(100.0));
    }

    #[test]
    fn rsi_period_0() {
        let series = calculate_rsi(&make_bars(&[10.0, 11.0]), 0);
        assert!(series.values.is_empty());
    }
}
