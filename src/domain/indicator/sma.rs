//! Simple Moving Average indicator.
//!
//! SMA(n) = (C[last-n+1] + ... + C[last]) / n
//! The window is summed directly so the value is exactly the mean of the
//! trailing n closes.

use crate::domain::ohlcv::PriceBar;

/// Mean close of the trailing `period` bars, or `None` without enough history.
pub fn trailing_sma(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    Some(mean_close(&bars[bars.len() - period..]))
}

fn mean_close(window: &[PriceBar]) -> f64 {
    window.iter().map(|b| b.close).sum::<f64>() / window.len() as f64
}
