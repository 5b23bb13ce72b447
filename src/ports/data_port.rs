//! Price provider port.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::PriceSeries;

pub trait DataPort {
    /// Up to `lookback_days` most recent daily bars for `symbol`, ascending by
    /// date with no duplicates. The window counts bars, not calendar days.
    fn fetch_series(&self, symbol: &str, lookback_days: usize)
        -> Result<PriceSeries, ScreenerError>;
}
