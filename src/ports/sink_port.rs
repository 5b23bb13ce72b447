//! Record sink ports: append-only storage for analysis rows, and read-back
//! of what was recorded.

use crate::domain::analysis::SheetRecord;
use crate::domain::error::ScreenerError;
use crate::domain::history::HistoryRow;

pub trait RecordSink {
    fn append(&self, record: &SheetRecord) -> Result<(), ScreenerError>;
}

pub trait RecordHistory {
    /// The trailing `limit` recorded rows, optionally for one symbol only,
    /// oldest first. A sink that was never written to has no history.
    fn history(&self, symbol: Option<&str>, limit: usize) -> Result<Vec<HistoryRow>, ScreenerError>;
}
