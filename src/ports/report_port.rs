//! Report export port.

use crate::domain::analysis::AnalysisResult;
use crate::domain::error::ScreenerError;
use std::path::Path;

/// Port for writing a finished batch to a file.
pub trait ReportPort {
    fn write(&self, results: &[AnalysisResult], output_path: &Path) -> Result<(), ScreenerError>;
}
