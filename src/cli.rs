//! CLI interface for callstat
//!
//! This module defines the command-line interface using clap. Source and
//! filter flags are global so they can be given before or after the command:
//! `callstat [flags] <command> [command flags]`.
//!
//! When the command is omitted, it defaults to `summary`.
//!
//! # Example
//!
//! ```bash
//! # Stat cards for qualified calls from the last week
//! callstat --outcome qualified --date-range 7days
//!
//! # Second page of calls mentioning "acme", read from a saved file
//! callstat --file calls.json calls --search acme --page 2
//!
//! # Live dashboard against a running API
//! callstat --api-url http://localhost:3000 watch --interval 10
//! ```

use crate::error::{CallstatError, Result};
use crate::filters::{
    DateRange, DurationBucket, FilterCriteria, SentimentBucket, parse_label_selector,
    parse_selector,
};
use crate::pagination::DEFAULT_PAGE_SIZE;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Search, filter and summarize sales-call records
#[derive(Parser, Debug, Clone)]
#[command(name = "callstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(flatten)]
    pub timezone: TimezoneArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Where the call records come from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Base URL of the call API (defaults to http://localhost:3000)
    #[arg(long, env = "CALLSTAT_API_URL", global = true, conflicts_with = "file")]
    pub api_url: Option<String>,

    /// Read calls from a JSON file instead of the API
    #[arg(long, env = "CALLSTAT_DATA_FILE", global = true)]
    pub file: Option<PathBuf>,
}

/// Filter flags, one per dashboard selector
///
/// Every selector accepts `all` to leave that dimension unfiltered.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive search over prospect name, notes and tags
    #[arg(long, short = 's', global = true)]
    pub search: Option<String>,

    /// Outcome to keep (qualified, not-qualified, closed-won, closed-lost, follow-up)
    #[arg(long, global = true)]
    pub outcome: Option<String>,

    /// Status to keep (completed, scheduled, cancelled)
    #[arg(long, global = true)]
    pub status: Option<String>,

    /// Sentiment bucket (positive, neutral, negative)
    #[arg(long, global = true)]
    pub sentiment: Option<String>,

    /// Duration bucket (short, medium, long)
    #[arg(long, global = true)]
    pub duration: Option<String>,

    /// Date range (7days, 30days, 90days)
    #[arg(long, global = true)]
    pub date_range: Option<String>,
}

impl FilterArgs {
    /// Build filter criteria from the flags
    ///
    /// Unknown bucket or range names are rejected; outcome and status labels
    /// are free text and simply match nothing when unknown.
    pub fn to_criteria(&self) -> Result<FilterCriteria> {
        let mut criteria = FilterCriteria::new();

        if let Some(term) = &self.search {
            criteria = criteria.with_search(term.as_str());
        }
        if let Some(outcome) = self.outcome.as_deref().and_then(parse_label_selector) {
            criteria = criteria.with_outcome(outcome);
        }
        if let Some(status) = self.status.as_deref().and_then(parse_label_selector) {
            criteria = criteria.with_status(status);
        }
        if let Some(raw) = &self.sentiment
            && let Some(bucket) = parse_selector::<SentimentBucket>(raw)?
        {
            criteria = criteria.with_sentiment(bucket);
        }
        if let Some(raw) = &self.duration
            && let Some(bucket) = parse_selector::<DurationBucket>(raw)?
        {
            criteria = criteria.with_duration(bucket);
        }
        if let Some(raw) = &self.date_range
            && let Some(range) = parse_selector::<DateRange>(raw)?
        {
            criteria = criteria.with_date_range(range);
        }

        Ok(criteria)
    }
}

/// Timezone arguments shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct TimezoneArgs {
    /// Timezone for date grouping (e.g. "America/New_York", "Asia/Tokyo", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC for date grouping (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the stat cards: total calls, average duration, qualified rate, sentiment
    Summary,

    /// List the filtered calls one page at a time
    Calls {
        /// Page to show, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,

        /// Calls per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Show calls over time, the outcome distribution and sentiment by outcome
    Charts {
        /// Order the calls-over-time series by date instead of first appearance
        #[arg(long)]
        chronological: bool,
    },

    /// Live dashboard that refreshes when the data changes
    Watch {
        /// Seconds between API refreshes
        #[arg(long, default_value = "30")]
        interval: u64,

        /// Quiet period in milliseconds before filters are re-applied
        #[arg(long, default_value = "300")]
        debounce_ms: u64,
    },
}

impl Command {
    /// Check argument values clap cannot validate on its own
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::Calls { page, page_size } => {
                if *page == 0 {
                    return Err(CallstatError::InvalidArgument(
                        "--page starts at 1".to_string(),
                    ));
                }
                if *page_size == 0 {
                    return Err(CallstatError::InvalidArgument(
                        "--page-size must be at least 1".to_string(),
                    ));
                }
                Ok(())
            }
            Command::Watch { interval, .. } if *interval == 0 => Err(
                CallstatError::InvalidArgument("--interval must be at least 1 second".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// Watch settings resolved from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    pub interval: Duration,
    pub debounce: Duration,
}

impl WatchSettings {
    pub fn new(interval_secs: u64, debounce_ms: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            debounce: Duration::from_millis(debounce_ms),
        }
    }
}
