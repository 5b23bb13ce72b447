pub mod console_report;
pub mod csv_adapter;
pub mod csv_export_adapter;
pub mod csv_sink_adapter;
pub mod file_config_adapter;

#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
