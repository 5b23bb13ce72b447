//! Technical indicator implementations.
//!
//! RSI and volatility return a full [`IndicatorSeries`] aligned with their
//! input bars, with warmup points marked invalid rather than dropped. SMA only
//! exposes the trailing value the signal calculator needs.
//! - `IndicatorPoint`: a single dated value plus its validity flag
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of indicator values

pub mod rsi;
pub mod sma;
pub mod stddev;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Volatility(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn empty(indicator_type: IndicatorType) -> Self {
        Self {
            indicator_type,
            values: Vec::new(),
        }
    }

    /// Value at the most recent bar, if that point is past warmup.
    pub fn latest_value(&self) -> Option<f64> {
        self.values
            .last()
            .filter(|p| p.valid && p.value.is_finite())
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Volatility(period) => write!(f, "VOLATILITY({})", period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, valid: bool, value: f64) -> IndicatorPoint {
        IndicatorPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            valid,
            value,
        }
    }

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(IndicatorType::Volatility(20).to_string(), "VOLATILITY(20)");
    }

    #[test]
    fn latest_value_valid() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(2),
            values: vec![point(1, false, 0.0), point(2, true, 15.0)],
        };
        assert_eq!(series.latest_value(), Some(15.0));
    }

    #[test]
    fn latest_value_in_warmup_is_none() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(5),
            values: vec![point(1, false, 0.0), point(2, false, 0.0)],
        };
        assert_eq!(series.latest_value(), None);
    }

    #[test]
    fn latest_value_non_finite_is_none() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Rsi(14),
            values: vec![point(1, true, f64::NAN)],
        };
        assert_eq!(series.latest_value(), None);
    }

    #[test]
    fn latest_value_empty_is_none() {
        assert_eq!(IndicatorSeries::empty(IndicatorType::Sma(3)).latest_value(), None);
    }
}
