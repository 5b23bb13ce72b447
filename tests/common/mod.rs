#![allow(dead_code)]

use chrono::NaiveDate;
use screener::domain::analysis::SheetRecord;
use screener::domain::error::ScreenerError;
pub use screener::domain::ohlcv::{PriceBar, PriceSeries};
use screener::domain::portfolio::{Portfolio, PortfolioEntry};
use screener::ports::data_port::DataPort;
use screener::ports::sink_port::RecordSink;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, usize)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        lookback_days: usize,
    ) -> Result<PriceSeries, ScreenerError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), lookback_days));

        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScreenerError::ProviderUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        let skip = bars.len().saturating_sub(lookback_days);
        PriceSeries::new(bars.into_iter().skip(skip).collect()).map_err(|source| {
            ScreenerError::InvalidSeries {
                symbol: symbol.to_string(),
                source,
            }
        })
    }
}

/// Keeps every appended row; fails every write once `fail_after` rows exist.
pub struct RecordingSink {
    pub rows: RefCell<Vec<SheetRecord>>,
    pub fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            rows: RefCell::new(Vec::new()),
            fail_after: None,
        }
    }

    pub fn failing_after(count: usize) -> Self {
        Self {
            rows: RefCell::new(Vec::new()),
            fail_after: Some(count),
        }
    }
}

impl RecordSink for RecordingSink {
    fn append(&self, record: &SheetRecord) -> Result<(), ScreenerError> {
        if let Some(limit) = self.fail_after {
            if self.rows.borrow().len() >= limit {
                return Err(ScreenerError::SinkWriteFailed {
                    reason: "sheet unavailable".into(),
                });
            }
        }
        self.rows.borrow_mut().push(record.clone());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// One bar per calendar day from 2024-01-01, closing at each price.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000_000 + i as u64,
        })
        .collect()
}

/// `count` closes rising by 1.0 from `start`.
pub fn rising_bars(count: usize, start: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| start + i as f64).collect();
    bars_from_closes(&closes)
}

/// `count` closes falling by 1.0 from `start`.
pub fn falling_bars(count: usize, start: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| start - i as f64).collect();
    bars_from_closes(&closes)
}

pub fn portfolio(entries: &[(&str, &str)]) -> Portfolio {
    Portfolio::new(
        "Test",
        entries
            .iter()
            .map(|(s, n)| PortfolioEntry::new(s, n))
            .collect(),
    )
    .unwrap()
}

/// Bars in the CSV provider file layout.
pub fn csv_content(bars: &[PriceBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
