//! Port traits at the external boundaries of the screener.

pub mod config_port;
pub mod data_port;
pub mod report_port;
pub mod sink_port;
