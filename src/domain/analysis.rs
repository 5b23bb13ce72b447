//! Portfolio aggregator: runs the signal calculator over a watchlist.
//!
//! Every per-symbol failure (provider error, empty or short history) is
//! contained here and recorded as a [`SkippedSymbol`]; a batch never aborts
//! because of one symbol. Sink writes are best-effort and only counted.

use crate::domain::error::ScreenerError;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::stddev::calculate_volatility;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::portfolio::{Portfolio, PortfolioEntry};
use crate::domain::signal::{compute_signals, IndicatorSnapshot, Recommendation, SignalConfig};
use crate::domain::summary::SummaryStatistics;
use crate::ports::data_port::DataPort;
use crate::ports::sink_port::RecordSink;
use chrono::{Local, NaiveDateTime};
use std::fmt;
use tracing::{debug, info, warn};

pub const DEFAULT_LOOKBACK_DAYS: usize = 60;
pub const PLACEHOLDER: &str = "N/A";
pub const SHEET_HEADERS: [&str; 11] = [
    "Timestamp",
    "Symbol",
    "Company",
    "Price ($)",
    "RSI",
    "MACD",
    "Signals",
    "Recommendation",
    "Volume",
    "Change (%)",
    "Analysis Type",
];

const RANGE_WINDOW: usize = 30;
const VOLUME_WINDOW: usize = 10;
pub const RSI_PERIOD: usize = 14;
pub const VOLATILITY_PERIOD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub signal: SignalConfig,
    pub lookback_days: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            signal: SignalConfig::default(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisType {
    Quick,
    Detailed,
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisType::Quick => write!(f, "Quick"),
            AnalysisType::Detailed => write!(f, "Detailed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub symbol: String,
    pub display_name: String,
    pub snapshot: IndicatorSnapshot,
    pub day_change_percent: Option<f64>,
    pub latest_volume: u64,
}

impl AnalysisResult {
    pub fn signal_count(&self) -> usize {
        self.snapshot.signal_count()
    }

    pub fn recommendation(&self) -> Recommendation {
        self.snapshot.recommendation
    }

    pub fn price(&self) -> f64 {
        self.snapshot.latest_price
    }
}

/// One sink row. Column order follows [`SHEET_HEADERS`].
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRecord {
    pub timestamp: NaiveDateTime,
    pub symbol: String,
    pub company: String,
    pub price: f64,
    pub rsi: String,
    pub macd: String,
    pub signals: String,
    pub recommendation: Recommendation,
    pub volume: u64,
    pub change_percent: Option<f64>,
    pub analysis_type: AnalysisType,
}

impl SheetRecord {
    pub fn from_result(
        result: &AnalysisResult,
        timestamp: NaiveDateTime,
        analysis_type: AnalysisType,
    ) -> Self {
        Self {
            timestamp,
            symbol: result.symbol.clone(),
            company: result.display_name.clone(),
            price: result.price(),
            rsi: PLACEHOLDER.to_string(),
            macd: PLACEHOLDER.to_string(),
            signals: result.snapshot.signals_label(),
            recommendation: result.recommendation(),
            volume: result.latest_volume,
            change_percent: result.day_change_percent,
            analysis_type,
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.symbol.clone(),
            self.company.clone(),
            format!("{:.2}", self.price),
            self.rsi.clone(),
            self.macd.clone(),
            self.signals.clone(),
            self.recommendation.to_string(),
            self.volume.to_string(),
            self.change_percent
                .map(|c| format!("{:.2}", c))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            self.analysis_type.to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    ProviderUnavailable { reason: String },
    NoData,
    InsufficientHistory { bars: usize, minimum: usize },
}

impl SkipReason {
    fn from_error(err: &ScreenerError) -> Self {
        match err {
            ScreenerError::NoData { .. } => SkipReason::NoData,
            ScreenerError::InsufficientHistory { bars, minimum, .. } => {
                SkipReason::InsufficientHistory {
                    bars: *bars,
                    minimum: *minimum,
                }
            }
            other => SkipReason::ProviderUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ProviderUnavailable { reason } => write!(f, "{}", reason),
            SkipReason::NoData => write!(f, "no data found"),
            SkipReason::InsufficientHistory { bars, minimum } => {
                write!(f, "only {} bars, minimum {} required", bars, minimum)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchOutcome {
    /// In portfolio order.
    pub results: Vec<AnalysisResult>,
    pub skipped: Vec<SkippedSymbol>,
    pub sink_failures: usize,
}

impl BatchOutcome {
    pub fn summary(&self) -> SummaryStatistics {
        SummaryStatistics::compute(&self.results)
    }
}

/// Fetch one entry's series and run the calculator on it.
pub fn analyze_entry(
    entry: &PortfolioEntry,
    data_port: &dyn DataPort,
    config: &AnalysisConfig,
) -> Result<(AnalysisResult, PriceSeries), ScreenerError> {
    let series = data_port.fetch_series(&entry.symbol, config.lookback_days)?;
    debug!(symbol = %entry.symbol, bars = series.len(), "fetched series");

    if series.is_empty() {
        return Err(ScreenerError::NoData {
            symbol: entry.symbol.clone(),
        });
    }

    let snapshot = compute_signals(&series, &config.signal).ok_or_else(|| {
        ScreenerError::InsufficientHistory {
            symbol: entry.symbol.clone(),
            bars: series.len(),
            minimum: config.signal.short_window,
        }
    })?;

    let result = AnalysisResult {
        symbol: entry.symbol.clone(),
        display_name: entry.display_name.clone(),
        snapshot,
        day_change_percent: series.day_change_percent(),
        latest_volume: series.latest().map(|b| b.volume).unwrap_or(0),
    };
    Ok((result, series))
}

/// Analyse every entry of `portfolio` in order.
///
/// Skipped symbols contribute to neither `results` nor the summary. When a
/// sink is given, each result is forwarded as a [`AnalysisType::Quick`] row;
/// a failed write is logged and counted but leaves `results` untouched.
pub fn run_batch(
    portfolio: &Portfolio,
    data_port: &dyn DataPort,
    sink: Option<&dyn RecordSink>,
    config: &AnalysisConfig,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for entry in &portfolio.entries {
        let result = match analyze_entry(entry, data_port, config) {
            Ok((result, _)) => result,
            Err(e) => {
                let reason = SkipReason::from_error(&e);
                warn!(symbol = %entry.symbol, "skipping {} ({})", entry.symbol, reason);
                outcome.skipped.push(SkippedSymbol {
                    symbol: entry.symbol.clone(),
                    reason,
                });
                continue;
            }
        };

        info!(
            symbol = %result.symbol,
            price = result.price(),
            signals = result.signal_count(),
            "{} {}",
            result.symbol,
            result.recommendation()
        );

        if let Some(sink) = sink {
            let record = SheetRecord::from_result(
                &result,
                Local::now().naive_local(),
                AnalysisType::Quick,
            );
            if let Err(e) = sink.append(&record) {
                warn!(symbol = %result.symbol, "sink write failed: {}", e);
                outcome.sink_failures += 1;
            }
        }

        outcome.results.push(result);
    }

    if !outcome.skipped.is_empty() {
        info!(
            "analysed {} of {} symbols in {}",
            outcome.results.len(),
            portfolio.len(),
            portfolio.name
        );
    }

    outcome
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailedAnalysis {
    pub result: AnalysisResult,
    pub windows: SignalConfig,
    pub bars: usize,
    /// Highest high over the trailing 30 bars.
    pub highest_high: f64,
    /// Lowest low over the trailing 30 bars.
    pub lowest_low: f64,
    /// (price - low) / low * 100
    pub performance_from_low: Option<f64>,
    /// (high - price) / price * 100
    pub distance_from_high: Option<f64>,
    /// Mean volume over the trailing 10 bars.
    pub average_volume: f64,
    pub rsi: Option<f64>,
    pub volatility: Option<f64>,
    pub sink_written: bool,
}

/// Single-symbol analysis with range, volume and informational indicators.
///
/// Unlike [`run_batch`], failures are returned to the caller.
pub fn analyze_detailed(
    portfolio: &Portfolio,
    symbol: &str,
    data_port: &dyn DataPort,
    sink: Option<&dyn RecordSink>,
    config: &AnalysisConfig,
) -> Result<DetailedAnalysis, ScreenerError> {
    let entry = portfolio
        .get(symbol)
        .ok_or_else(|| ScreenerError::UnknownSymbol {
            symbol: symbol.trim().to_uppercase(),
            portfolio: portfolio.name.clone(),
            available: portfolio.symbols().join(", "),
        })?;

    let (result, series) = analyze_entry(entry, data_port, config)?;

    let range = series.tail(RANGE_WINDOW);
    let highest_high = range.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let lowest_low = range.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let price = result.price();

    let performance_from_low = (lowest_low > 0.0).then(|| (price - lowest_low) / lowest_low * 100.0);
    let distance_from_high = (price > 0.0).then(|| (highest_high - price) / price * 100.0);

    let volume_window = series.tail(VOLUME_WINDOW);
    let average_volume =
        volume_window.iter().map(|b| b.volume as f64).sum::<f64>() / volume_window.len() as f64;

    let rsi = calculate_rsi(series.bars(), RSI_PERIOD).latest_value();
    let volatility = calculate_volatility(series.bars(), VOLATILITY_PERIOD).latest_value();

    let sink_written = match sink {
        Some(sink) => {
            let record =
                SheetRecord::from_result(&result, Local::now().naive_local(), AnalysisType::Detailed);
            match sink.append(&record) {
                Ok(()) => true,
                Err(e) => {
                    warn!(symbol = %result.symbol, "sink write failed: {}", e);
                    false
                }
            }
        }
        None => false,
    };

    Ok(DetailedAnalysis {
        result,
        windows: config.signal,
        bars: series.len(),
        highest_high,
        lowest_low,
        performance_from_low,
        distance_from_high,
        average_volume,
        rsi,
        volatility,
        sink_written,
    })
}
