//! Close-price volatility: sample standard deviation over n closes.
//!
//! VOLATILITY(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / (n - 1))
//! Warmup: first (n-1) bars are invalid. Undefined for n < 2.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_volatility(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period < 2 {
        return IndicatorSeries::empty(IndicatorType::Volatility(period));
    }

    let mut values = Vec::with_capacity(bars.len());
    let warmup = period - 1;

    for i in 0..bars.len() {
        let date = bars[i].date;
        let valid = i >= warmup;

        let value = if valid {
            let window = &bars[i + 1 - period..=i];
            let mean: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| {
                    let diff = b.close - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (period - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        values.push(IndicatorPoint { date, valid, value });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Volatility(period),
        values,
    }
}
