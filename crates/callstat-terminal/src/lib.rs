//! Terminal output formatting for callstat
//!
//! This crate provides table and JSON output formatters
//! and the boxed live dashboard display.

pub mod dashboard;
pub mod output;

pub use dashboard::DashboardRenderer;
pub use output::{CallPage, ChartData, JsonFormatter, OutputFormatter, TableFormatter, get_formatter};
