//! Core types, filtering and aggregation for callstat
//!
//! This crate provides the call record model, error handling, timezone
//! configuration, the filter predicate and pipeline, summary statistics and
//! chart groupings used by all other callstat crates.

pub mod debounce;
pub mod error;
pub mod filters;
pub mod grouping;
pub mod pagination;
pub mod pipeline;
pub mod provider;
pub mod stats;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{CallstatError, Result};
pub use filters::{DateRange, DurationBucket, FilterCriteria, SentimentBucket};
pub use grouping::{
    DailyCallCount, OutcomeDistribution, SentimentByOutcome, avg_sentiment_by_outcome,
    group_by_date, group_by_outcome, sort_chronologically,
};
pub use pagination::Pager;
pub use pipeline::{DEFAULT_DEBOUNCE, DashboardView, FilterPipeline, filter_calls};
pub use stats::{CallStats, summarize};
pub use timezone::TimezoneConfig;
pub use types::{ApiResponse, CallId, CallRecord, CallStatus, DailyDate, Outcome};
