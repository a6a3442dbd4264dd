//! callstat - Search, filter and summarize sales-call records
//!
//! This library provides functionality to:
//! - Load call records from the dashboard API or a saved JSON file
//! - Filter calls by search term, outcome, status, sentiment, duration and date range
//! - Compute the dashboard stat cards and chart series
//! - Recompute everything through a debounced pipeline as filters change
//! - Render reports as tables, JSON or a live terminal dashboard
//!
//! # Examples
//!
//! ```no_run
//! use callstat::{
//!     filters::{FilterCriteria, SentimentBucket},
//!     pipeline::filter_calls,
//!     report::load_calls,
//!     stats::summarize,
//! };
//! use callstat_source::open_source;
//!
//! #[tokio::main]
//! async fn main() -> callstat::Result<()> {
//!     let source = open_source(Some("http://localhost:3000"), None)?;
//!     let calls = load_calls(source.as_ref(), false).await?;
//!
//!     let criteria = FilterCriteria::new()
//!         .with_search("acme")
//!         .with_sentiment(SentimentBucket::Positive);
//!     let stats = summarize(&filter_calls(&calls, &criteria));
//!     println!("{} calls, {:.0}% qualified", stats.total_calls, stats.qualified_rate_percent);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod live_monitor;
pub mod report;

// Core modules, re-exported so the binary and library users share one path
pub use callstat_core::{
    debounce, error, filters, grouping, pagination, pipeline, provider, stats, timezone, types,
};

// Re-export commonly used types
pub use callstat_core::{
    CallId, CallRecord, CallStats, CallstatError, DashboardView, FilterCriteria, FilterPipeline,
    Result, TimezoneConfig,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
