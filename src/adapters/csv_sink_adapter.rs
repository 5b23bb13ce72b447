//! CSV "sheet" sink: appends analysis rows to a local file.
//!
//! The file is created with the 11-column header on first write; later writes
//! only append rows. Each append opens and closes the file so rows written
//! before a crash stay on disk. Reading history goes through the header, so
//! columns may be reordered by hand without breaking it.

use crate::domain::analysis::{SheetRecord, SHEET_HEADERS};
use crate::domain::error::ScreenerError;
use crate::domain::history::{select_history, HistoryRow};
use crate::ports::sink_port::{RecordHistory, RecordSink};
use serde::Deserialize;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Company")]
    company: String,
    #[serde(rename = "Price ($)")]
    price: String,
    #[serde(rename = "Signals")]
    signals: String,
    #[serde(rename = "Recommendation")]
    recommendation: String,
    #[serde(rename = "Change (%)")]
    change_percent: String,
    #[serde(rename = "Analysis Type")]
    analysis_type: String,
}

impl From<SheetRow> for HistoryRow {
    fn from(row: SheetRow) -> Self {
        HistoryRow {
            timestamp: row.timestamp,
            symbol: row.symbol,
            company: row.company,
            price: row.price,
            signals: row.signals,
            recommendation: row.recommendation,
            change_percent: row.change_percent,
            analysis_type: row.analysis_type,
        }
    }
}

pub struct CsvSheetSink {
    path: PathBuf,
}

impl CsvSheetSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSheetSink {
    fn append(&self, record: &SheetRecord) -> Result<(), ScreenerError> {
        let failed = |reason: String| ScreenerError::SinkWriteFailed { reason };

        let is_new = self
            .path
            .metadata()
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| failed(format!("failed to open {}: {}", self.path.display(), e)))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            writer
                .write_record(SHEET_HEADERS)
                .map_err(|e| failed(e.to_string()))?;
        }
        writer
            .write_record(record.to_row())
            .map_err(|e| failed(e.to_string()))?;
        writer.flush().map_err(|e| failed(e.to_string()))?;
        Ok(())
    }
}

impl RecordHistory for CsvSheetSink {
    fn history(&self, symbol: Option<&str>, limit: usize) -> Result<Vec<HistoryRow>, ScreenerError> {
        let failed = |reason: String| ScreenerError::SinkReadFailed { reason };

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(failed(format!(
                    "failed to open {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let mut rows = Vec::new();
        for (i, row) in rdr.deserialize::<SheetRow>().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let row = row.map_err(|e| failed(format!("row {}: {}", i + 2, e)))?;
            rows.push(HistoryRow::from(row));
        }
        Ok(select_history(rows, symbol, limit))
    }
}
