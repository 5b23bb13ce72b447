//! Moving-average signal calculator.
//!
//! Turns a [`PriceSeries`] into an [`IndicatorSnapshot`]: latest close, short
//! and long simple moving averages, the bullish conditions that hold, and a
//! BUY/SELL/HOLD recommendation derived only from how many conditions hold.
//!
//! When the series is too short for the long average, the two conditions that
//! need it are left out of evaluation entirely. The reachable signal count then
//! tops out at 1, which means such a series can never produce BUY.

use crate::domain::indicator::sma::trailing_sma;
use crate::domain::ohlcv::PriceSeries;
use std::fmt;

pub const DEFAULT_SHORT_WINDOW: usize = 20;
pub const DEFAULT_LONG_WINDOW: usize = 50;
pub const MAX_SIGNALS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalConfig {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

/// A named bullish condition, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    PriceAboveShort,
    PriceAboveLong,
    ShortAboveLong,
}

impl Signal {
    pub fn label(self) -> &'static str {
        match self {
            Signal::PriceAboveShort => "price above short average",
            Signal::PriceAboveLong => "price above long average",
            Signal::ShortAboveLong => "short average above long average",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    /// 3 → BUY, 1 or 2 → HOLD, 0 → SELL.
    pub fn from_signal_count(count: usize) -> Self {
        match count {
            0 => Recommendation::Sell,
            c if c >= MAX_SIGNALS => Recommendation::Buy,
            _ => Recommendation::Hold,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Hold => write!(f, "HOLD"),
            Recommendation::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub latest_price: f64,
    pub short_average: f64,
    pub long_average: Option<f64>,
    pub active_signals: Vec<Signal>,
    pub recommendation: Recommendation,
}

impl IndicatorSnapshot {
    pub fn signal_count(&self) -> usize {
        self.active_signals.len()
    }

    /// Active signal labels joined with ", ".
    pub fn signals_label(&self) -> String {
        self.active_signals
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// e.g. "2/3"
    pub fn signal_fraction(&self) -> String {
        format!("{}/{}", self.signal_count(), MAX_SIGNALS)
    }

    pub fn advice(&self) -> &'static str {
        match self.signal_count() {
            3 => "All signals are positive - good time to buy",
            2 => "Mixed signals - wait for confirmation",
            1 => "Few positive signals - caution recommended",
            _ => "No positive signals - avoid buying now",
        }
    }
}

/// Compute the snapshot for `series`, or `None` when it holds fewer than
/// `config.short_window` bars.
pub fn compute_signals(series: &PriceSeries, config: &SignalConfig) -> Option<IndicatorSnapshot> {
    if series.is_empty() || series.len() < config.short_window {
        return None;
    }

    let bars = series.bars();
    let latest_price = series.latest()?.close;
    let short_average = trailing_sma(bars, config.short_window)?;
    let long_average = trailing_sma(bars, config.long_window);

    let mut active_signals = Vec::with_capacity(MAX_SIGNALS);
    if latest_price > short_average {
        active_signals.push(Signal::PriceAboveShort);
    }
    if let Some(long) = long_average {
        if latest_price > long {
            active_signals.push(Signal::PriceAboveLong);
        }
        if short_average > long {
            active_signals.push(Signal::ShortAboveLong);
        }
    }

    let recommendation = Recommendation::from_signal_count(active_signals.len());

    Some(IndicatorSnapshot {
        latest_price,
        short_average,
        long_average,
        active_signals,
        recommendation,
    })
}
