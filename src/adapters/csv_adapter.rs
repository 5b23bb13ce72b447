//! CSV file price provider.
//!
//! Reads `<base_path>/<SYMBOL>.csv` with a `date,open,high,low,close,volume`
//! header. Rows may appear in any order; they are sorted by date, duplicate
//! dates keep the last row, and only the trailing `lookback_days` bars are
//! returned.

use crate::domain::error::ScreenerError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Symbols with a CSV file in the base directory, sorted.
    pub fn list_symbols(&self) -> Result<Vec<String>, ScreenerError> {
        let mut symbols = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(symbol) = name.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        lookback_days: usize,
    ) -> Result<PriceSeries, ScreenerError> {
        let path = self.csv_path(symbol);
        let unavailable = |reason: String| ScreenerError::ProviderUnavailable {
            symbol: symbol.to_string(),
            reason,
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ScreenerError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(unavailable(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();

        for row in rdr.deserialize::<CsvRow>() {
            let row = row.map_err(|e| unavailable(format!("CSV parse error: {}", e)))?;
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
                .map_err(|e| unavailable(format!("invalid date '{}': {}", row.date, e)))?;

            by_date.insert(
                date,
                PriceBar {
                    date,
                    open: row.open,
                    high: row.high,
                    low: row.low,
                    close: row.close,
                    volume: row.volume,
                },
            );
        }

        let skip = by_date.len().saturating_sub(lookback_days);
        let bars: Vec<PriceBar> = by_date.into_values().skip(skip).collect();

        PriceSeries::new(bars).map_err(|source| ScreenerError::InvalidSeries {
            symbol: symbol.to_string(),
            source,
        })
    }
}
