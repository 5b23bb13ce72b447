//! CSV export adapter implementing ReportPort.
//!
//! Writes one row per analysed symbol, in batch order, to a fresh file.

use crate::domain::analysis::AnalysisResult;
use crate::domain::error::ScreenerError;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    symbol: &'a str,
    name: &'a str,
    price: f64,
    short_average: f64,
    long_average: Option<f64>,
    signal_count: usize,
    signals: String,
    recommendation: String,
    day_change_percent: Option<f64>,
    volume: u64,
}

impl<'a> From<&'a AnalysisResult> for ExportRow<'a> {
    fn from(r: &'a AnalysisResult) -> Self {
        Self {
            symbol: &r.symbol,
            name: &r.display_name,
            price: r.price(),
            short_average: r.snapshot.short_average,
            long_average: r.snapshot.long_average,
            signal_count: r.signal_count(),
            signals: r.snapshot.signals_label(),
            recommendation: r.recommendation().to_string(),
            day_change_percent: r.day_change_percent,
            volume: r.latest_volume,
        }
    }
}

/// `analysis_YYYYMMDD_HHMMSS.csv` in `dir`.
pub fn default_export_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    dir.join(format!("analysis_{}.csv", now.format("%Y%m%d_%H%M%S")))
}

pub struct CsvExportAdapter;

impl ReportPort for CsvExportAdapter {
    fn write(&self, results: &[AnalysisResult], output_path: &Path) -> Result<(), ScreenerError> {
        let export_err = |e: csv::Error| ScreenerError::Export {
            reason: format!("{}: {}", output_path.display(), e),
        };

        let mut writer = csv::Writer::from_path(output_path).map_err(export_err)?;
        for result in results {
            writer.serialize(ExportRow::from(result)).map_err(export_err)?;
        }
        writer.flush().map_err(|e| ScreenerError::Export {
            reason: format!("{}: {}", output_path.display(), e),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::{IndicatorSnapshot, Recommendation, Signal};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn result(symbol: &str, long: Option<f64>) -> AnalysisResult {
        AnalysisResult {
            symbol: symbol.to_string(),
            display_name: format!("{} Inc", symbol),
            snapshot: IndicatorSnapshot {
                latest_price: 120.5,
                short_average: 110.0,
                long_average: long,
                active_signals: vec![Signal::PriceAboveShort],
                recommendation: Recommendation::Hold,
            },
            day_change_percent: Some(0.5),
            latest_volume: 4200,
        }
    }

    #[test]
    fn default_path_uses_timestamp() {
        let now = NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .and_hms_opt(8, 3, 59)
            .unwrap();
        assert_eq!(
            default_export_path(Path::new("out"), now),
            PathBuf::from("out/analysis_20240704_080359.csv")
        );
    }

    #[test]
    fn write_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.csv");

        CsvExportAdapter
            .write(&[result("NVDA", Some(100.0)), result("AAPL", None)], &path)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "symbol,name,price,short_average,long_average,signal_count,signals,recommendation,day_change_percent,volume"
        );
        assert_eq!(
            lines[1],
            "NVDA,NVDA Inc,120.5,110.0,100.0,1,price above short average,HOLD,0.5,4200"
        );
        assert_eq!(
            lines[2],
            "AAPL,AAPL Inc,120.5,110.0,,1,price above short average,HOLD,0.5,4200"
        );
    }

    #[test]
    fn write_empty_batch_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        CsvExportAdapter.write(&[], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("export.csv");
        let result = CsvExportAdapter.write(&[result("AAPL", None)], &path);
        assert!(matches!(result, Err(ScreenerError::Export { .. })));
    }
}
