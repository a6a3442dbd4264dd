//! One-shot reports
//!
//! Fetches the calls once, applies the criteria and renders the summary,
//! call list or chart sections through an output formatter.

use crate::error::Result;
use crate::filters::FilterCriteria;
use crate::grouping::{avg_sentiment_by_outcome, group_by_date, group_by_outcome, sort_chronologically};
use crate::pagination::Pager;
use crate::pipeline::filter_calls;
use crate::provider::CallSource;
use crate::stats::summarize;
use crate::timezone::TimezoneConfig;
use crate::types::CallRecord;
use callstat_terminal::{CallPage, ChartData, OutputFormatter};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;

/// Fetch every call from the source, showing a spinner when asked
pub async fn load_calls(source: &dyn CallSource, show_progress: bool) -> Result<Vec<CallRecord>> {
    let progress = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
        {
            pb.set_style(style);
        }
        pb.set_message(format!("Fetching calls from {}", source.describe()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = source.fetch_calls().await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let calls = result?;
    info!("Loaded {} calls from {}", calls.len(), source.describe());
    Ok(calls)
}

/// Stat cards for the filtered calls
pub fn summary_report(
    calls: &[CallRecord],
    criteria: &FilterCriteria,
    formatter: &dyn OutputFormatter,
) -> String {
    let filtered = filter_calls(calls, criteria);
    formatter.format_summary(&summarize(&filtered), criteria)
}

/// One page of the filtered calls
///
/// `page` counts from 1; a page past the end shows the last page.
pub fn calls_report(
    calls: &[CallRecord],
    criteria: &FilterCriteria,
    page: usize,
    page_size: usize,
    formatter: &dyn OutputFormatter,
) -> Result<String> {
    let filtered = filter_calls(calls, criteria);
    let mut pager = Pager::new(page_size)?;
    pager.set_page(page.saturating_sub(1));

    let page_calls = pager.page_of(&filtered);
    let call_page = CallPage {
        calls: page_calls,
        page: pager.page(),
        total_pages: pager.total_pages(filtered.len()),
        total_matches: filtered.len(),
    };
    Ok(formatter.format_calls(&call_page))
}

/// Chart series for the filtered calls
pub fn charts_report(
    calls: &[CallRecord],
    criteria: &FilterCriteria,
    timezone: &TimezoneConfig,
    chronological: bool,
    formatter: &dyn OutputFormatter,
) -> String {
    let filtered = filter_calls(calls, criteria);

    let mut by_date = group_by_date(&filtered, timezone);
    if chronological {
        sort_chronologically(&mut by_date);
    }
    let outcomes = group_by_outcome(&filtered);
    let sentiment_by_outcome = avg_sentiment_by_outcome(&filtered);

    formatter.format_charts(&ChartData {
        by_date: &by_date,
        outcomes: &outcomes,
        sentiment_by_outcome: &sentiment_by_outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallstatError;
    use crate::filters::SentimentBucket;
    use crate::types::{CallId, Outcome};
    use async_trait::async_trait;
    use callstat_terminal::{JsonFormatter, TableFormatter};
    use chrono::{TimeZone, Utc};

    fn call(id: &str, day: u32, outcome: Outcome, sentiment: f64) -> CallRecord {
        CallRecord {
            id: CallId::new(id),
            prospect_name: Some(format!("Prospect {id}")),
            date: Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap(),
            duration: 600,
            outcome,
            status: None,
            sentiment_score: sentiment,
            notes: None,
            tags: None,
        }
    }

    fn calls() -> Vec<CallRecord> {
        vec![
            call("a", 3, Outcome::Qualified, 0.8),
            call("b", 1, Outcome::Lost, 0.2),
            call("c", 3, Outcome::ClosedWon, 0.7),
            call("d", 2, Outcome::FollowUp, 0.5),
        ]
    }

    struct StaticSource(Vec<CallRecord>);

    #[async_trait]
    impl CallSource for StaticSource {
        async fn fetch_calls(&self) -> Result<Vec<CallRecord>> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CallSource for FailingSource {
        async fn fetch_calls(&self) -> Result<Vec<CallRecord>> {
            Err(CallstatError::fetch(None))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[tokio::test]
    async fn test_load_calls() {
        let loaded = load_calls(&StaticSource(calls()), false).await.unwrap();
        assert_eq!(loaded.len(), 4);

        let err = load_calls(&FailingSource, false).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch calls");
    }

    #[test]
    fn test_summary_report_json() {
        let criteria = FilterCriteria::new();
        let output = summary_report(&calls(), &criteria, &JsonFormatter);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["stats"]["total_calls"], 4);
        assert_eq!(value["stats"]["qualified_rate_percent"], 50.0);
    }

    #[test]
    fn test_calls_report_pages() {
        let criteria = FilterCriteria::new();
        let output = calls_report(&calls(), &criteria, 2, 3, &JsonFormatter).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["page"], 2);
        assert_eq!(value["total_pages"], 2);
        assert_eq!(value["total_matches"], 4);
        assert_eq!(value["calls"].as_array().unwrap().len(), 1);
        assert_eq!(value["calls"][0]["id"], "d");

        assert!(calls_report(&calls(), &criteria, 1, 0, &JsonFormatter).is_err());
    }

    #[test]
    fn test_calls_report_past_end_shows_last_page() {
        let criteria = FilterCriteria::new();
        let output = calls_report(&calls(), &criteria, 9, 3, &JsonFormatter).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["page"], 2);
    }

    #[test]
    fn test_charts_report_order() {
        let criteria = FilterCriteria::new();
        let tz = TimezoneConfig::utc();

        let output = charts_report(&calls(), &criteria, &tz, false, &JsonFormatter);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        let dates: Vec<&str> = value["calls_over_time"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, ["2024-05-03", "2024-05-01", "2024-05-02"]);

        let output = charts_report(&calls(), &criteria, &tz, true, &JsonFormatter);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["calls_over_time"][0]["date"], "2024-05-01");
    }

    #[test]
    fn test_filtered_table_report() {
        let criteria = FilterCriteria::new().with_sentiment(SentimentBucket::Positive);
        let output = summary_report(&calls(), &criteria, &TableFormatter::new(TimezoneConfig::utc()));
        assert!(output.contains("Total Calls"));
        assert!(output.contains("sentiment=positive"));
    }
}
