//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod portfolio;
pub mod analysis;
pub mod summary;
pub mod history;
pub mod config_validation;
pub mod error;
