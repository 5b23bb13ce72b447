//! Domain error types.

use crate::domain::ohlcv::SeriesError;
use crate::domain::portfolio::PortfolioError;

/// Top-level error type for screener.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Portfolio(#[from] PortfolioError),

    #[error("'{symbol}' is not in portfolio {portfolio} (available: {available})")]
    UnknownSymbol {
        symbol: String,
        portfolio: String,
        available: String,
    },

    #[error("price provider unavailable for {symbol}: {reason}")]
    ProviderUnavailable { symbol: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("invalid price series for {symbol}: {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: SeriesError,
    },

    #[error("insufficient history for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("sink write failed: {reason}")]
    SinkWriteFailed { reason: String },

    #[error("sink read failed: {reason}")]
    SinkReadFailed { reason: String },

    #[error("export failed: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. }
            | ScreenerError::Portfolio(_) => 2,
            ScreenerError::UnknownSymbol { .. } => 3,
            ScreenerError::ProviderUnavailable { .. }
            | ScreenerError::NoData { .. }
            | ScreenerError::InvalidSeries { .. }
            | ScreenerError::InsufficientHistory { .. } => 4,
            ScreenerError::SinkWriteFailed { .. }
            | ScreenerError::SinkReadFailed { .. }
            | ScreenerError::Export { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
