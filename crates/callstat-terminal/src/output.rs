//! Output formatting module for callstat
//!
//! This module provides formatters for displaying call analytics in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use callstat_core::filters::FilterCriteria;
//! use callstat_core::stats::summarize;
//! use callstat_core::timezone::TimezoneConfig;
//! use callstat_terminal::output::get_formatter;
//!
//! let stats = summarize(&[]);
//! let criteria = FilterCriteria::new();
//!
//! // Get table formatter for human-readable output
//! let formatter = get_formatter(false, TimezoneConfig::utc());
//! println!("{}", formatter.format_summary(&stats, &criteria));
//!
//! // Get JSON formatter for machine-readable output
//! let json_formatter = get_formatter(true, TimezoneConfig::utc());
//! assert!(json_formatter.format_summary(&stats, &criteria).contains("\"total_calls\""));
//! ```

use callstat_core::filters::FilterCriteria;
use callstat_core::grouping::{DailyCallCount, OutcomeDistribution, SentimentByOutcome};
use callstat_core::stats::CallStats;
use callstat_core::timezone::TimezoneConfig;
use callstat_core::types::CallRecord;
use prettytable::{Table, format, row};
use serde_json::{Value, json};

/// Width of the bars drawn in chart tables
const CHART_BAR_WIDTH: usize = 30;

/// One page of the filtered call list
#[derive(Debug, Clone, Copy)]
pub struct CallPage<'a> {
    /// Calls on this page
    pub calls: &'a [CallRecord],
    /// Zero-based page index
    pub page: usize,
    pub total_pages: usize,
    /// Calls matching the filters across all pages
    pub total_matches: usize,
}

/// Series shown by the charts command
#[derive(Debug, Clone, Copy)]
pub struct ChartData<'a> {
    pub by_date: &'a [DailyCallCount],
    pub outcomes: &'a OutcomeDistribution,
    pub sentiment_by_outcome: &'a SentimentByOutcome,
}

/// Trait for output formatters
///
/// This trait defines the interface for rendering the dashboard sections.
/// Implementations can provide different output formats (table, JSON, ...).
///
/// # Example Implementation
///
/// ```
/// use callstat_core::filters::FilterCriteria;
/// use callstat_core::stats::CallStats;
/// use callstat_terminal::output::{CallPage, ChartData, OutputFormatter};
///
/// struct OneLineFormatter;
///
/// impl OutputFormatter for OneLineFormatter {
///     fn format_summary(&self, stats: &CallStats, _criteria: &FilterCriteria) -> String {
///         format!("{} calls", stats.total_calls)
///     }
///
///     fn format_calls(&self, page: &CallPage<'_>) -> String {
///         format!("page {} of {}", page.page + 1, page.total_pages)
///     }
///
///     fn format_charts(&self, charts: &ChartData<'_>) -> String {
///         format!("{} days", charts.by_date.len())
///     }
/// }
/// ```
pub trait OutputFormatter {
    /// Format the headline statistics
    fn format_summary(&self, stats: &CallStats, criteria: &FilterCriteria) -> String;

    /// Format one page of the filtered calls
    fn format_calls(&self, page: &CallPage<'_>) -> String;

    /// Format the chart series
    fn format_charts(&self, charts: &ChartData<'_>) -> String;
}

/// Round half away from zero, the way the dashboard cards display numbers
pub fn format_rounded(value: f64, suffix: &str) -> String {
    if value.is_finite() {
        format!("{}{suffix}", value.round() as i64)
    } else {
        format!("0{suffix}")
    }
}

/// Short text listing the active filters, or "none"
pub fn describe_filters(criteria: &FilterCriteria) -> String {
    let mut parts = Vec::new();
    if !criteria.search_term.is_empty() {
        parts.push(format!("search \"{}\"", criteria.search_term));
    }
    if let Some(outcome) = &criteria.outcome {
        parts.push(format!("outcome={outcome}"));
    }
    if let Some(status) = &criteria.status {
        parts.push(format!("status={status}"));
    }
    if let Some(sentiment) = criteria.sentiment {
        parts.push(format!("sentiment={sentiment}"));
    }
    if let Some(duration) = criteria.duration {
        parts.push(format!("duration={duration}"));
    }
    if let Some(range) = criteria.date_range {
        parts.push(format!("date-range={range}"));
    }

    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}

/// Table formatter for human-readable output
///
/// Produces ASCII tables suitable for terminal display. Percentages and
/// durations are rounded the same way the dashboard cards show them.
pub struct TableFormatter {
    /// Timezone used for call timestamps
    pub timezone: TimezoneConfig,
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(timezone: TimezoneConfig) -> Self {
        Self { timezone }
    }

    fn format_call_date(&self, call: &CallRecord) -> String {
        call.date
            .with_timezone(&self.timezone.tz)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    fn bar(value: usize, max: usize) -> String {
        if max == 0 {
            return String::new();
        }
        let filled = (value * CHART_BAR_WIDTH).div_ceil(max).min(CHART_BAR_WIDTH);
        "#".repeat(filled)
    }
}

impl OutputFormatter for TableFormatter {
    fn format_summary(&self, stats: &CallStats, criteria: &FilterCriteria) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Metric", b -> "Value"]);

        table.add_row(row!["Total Calls", r -> stats.total_calls]);
        table.add_row(row![
            "Avg Duration",
            r -> format_rounded(stats.avg_duration_minutes, "m")
        ]);
        table.add_row(row![
            "Qualified Rate",
            r -> format_rounded(stats.qualified_rate_percent, "%")
        ]);
        table.add_row(row![
            "Avg Sentiment",
            r -> format_rounded(stats.avg_sentiment_percent, "%")
        ]);

        format!("{}\nFilters: {}\n", table, describe_filters(criteria))
    }

    fn format_calls(&self, page: &CallPage<'_>) -> String {
        if page.total_matches == 0 {
            return "No calls match the current filters\n".to_string();
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Date",
            b -> "Prospect",
            b -> "Outcome",
            b -> "Status",
            b -> "Duration",
            b -> "Sentiment",
            b -> "Tags"
        ]);

        for call in page.calls {
            table.add_row(row![
                self.format_call_date(call),
                call.prospect_name.as_deref().unwrap_or("-"),
                call.outcome,
                call.status.as_ref().map_or("-", |s| s.as_str()),
                r -> format_rounded(call.duration_minutes(), "m"),
                r -> format_rounded(call.sentiment_score * 100.0, "%"),
                call.tags().join(", ")
            ]);
        }

        format!(
            "{}\nPage {} of {} ({} matching calls, times in {})\n",
            table,
            page.page + 1,
            page.total_pages,
            page.total_matches,
            self.timezone.display_name()
        )
    }

    fn format_charts(&self, charts: &ChartData<'_>) -> String {
        let mut output = String::new();

        output.push_str("Calls Over Time\n");
        let mut timeline = Table::new();
        timeline.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        timeline.set_titles(row![b -> "Date", b -> "Total", b -> "Qualified", b -> ""]);
        let max_total = charts.by_date.iter().map(|d| d.total).max().unwrap_or(0);
        for day in charts.by_date {
            timeline.add_row(row![
                day.date,
                r -> day.total,
                r -> day.qualified,
                Self::bar(day.total, max_total)
            ]);
        }
        output.push_str(&timeline.to_string());

        output.push_str("\nCall Outcome Distribution\n");
        let mut outcomes = Table::new();
        outcomes.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        outcomes.set_titles(row![b -> "Outcome", b -> "Calls", b -> "Share"]);
        let total = charts.outcomes.total();
        for (group, count) in charts.outcomes.entries() {
            let share = if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            };
            outcomes.add_row(row![group.label(), r -> count, r -> format_rounded(share, "%")]);
        }
        output.push_str(&outcomes.to_string());

        output.push_str("\nAvg Sentiment by Outcome\n");
        let mut sentiment = Table::new();
        sentiment.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        sentiment.set_titles(row![b -> "Outcome", b -> "Avg Sentiment", b -> "Calls", b -> ""]);
        for bucket in &charts.sentiment_by_outcome.buckets {
            let percent = bucket.avg_sentiment * 100.0;
            let filled = percent.clamp(0.0, 100.0).round() as usize;
            sentiment.add_row(row![
                bucket.bucket,
                r -> format!("{:.2}", bucket.avg_sentiment),
                r -> bucket.calls,
                Self::bar(filled, 100)
            ]);
        }
        output.push_str(&sentiment.to_string());

        output
    }
}

/// JSON formatter for machine-readable output
///
/// Produces structured JSON that keeps every value at full precision.
pub struct JsonFormatter;

impl JsonFormatter {
    fn criteria_json(criteria: &FilterCriteria) -> Value {
        json!({
            "search": criteria.search_term,
            "outcome": criteria.outcome,
            "status": criteria.status,
            "sentiment": criteria.sentiment,
            "duration": criteria.duration,
            "date_range": criteria.date_range,
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_summary(&self, stats: &CallStats, criteria: &FilterCriteria) -> String {
        let output = json!({
            "stats": stats,
            "filters": Self::criteria_json(criteria),
        });
        format!("{output:#}")
    }

    fn format_calls(&self, page: &CallPage<'_>) -> String {
        let output = json!({
            "calls": page.calls,
            "page": page.page + 1,
            "total_pages": page.total_pages,
            "total_matches": page.total_matches,
        });
        format!("{output:#}")
    }

    fn format_charts(&self, charts: &ChartData<'_>) -> String {
        let output = json!({
            "calls_over_time": charts.by_date,
            "outcome_distribution": charts.outcomes,
            "sentiment_by_outcome": charts.sentiment_by_outcome.buckets,
        });
        format!("{output:#}")
    }
}

/// Get the appropriate formatter based on output format preference
pub fn get_formatter(json: bool, timezone: TimezoneConfig) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(timezone))
    }
}
