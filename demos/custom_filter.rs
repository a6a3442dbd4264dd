//! Example of combining filters with callstat
//!
//! This example narrows the calls to positive, long calls from the last
//! 30 days and breaks them down by day and outcome.

use callstat::{
    Result,
    filters::{DateRange, DurationBucket, FilterCriteria, SentimentBucket},
    grouping::{group_by_date, group_by_outcome, sort_chronologically},
    pipeline::filter_calls,
    report::load_calls,
    timezone::TimezoneConfig,
};
use callstat_source::open_source;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let file = std::env::var_os("CALLSTAT_DATA_FILE").map(PathBuf::from);
    let source = open_source(None, file.as_deref())?;
    let calls = load_calls(source.as_ref(), false).await?;

    let criteria = FilterCriteria::new()
        .with_sentiment(SentimentBucket::Positive)
        .with_duration(DurationBucket::Long)
        .with_date_range(DateRange::Last30Days);

    println!(
        "Filtering {} calls ({} active filters)...\n",
        calls.len(),
        criteria.active_filter_count()
    );
    let filtered = filter_calls(&calls, &criteria);

    if filtered.is_empty() {
        println!("No positive long calls in the last 30 days");
        return Ok(());
    }

    let mut by_date = group_by_date(&filtered, &TimezoneConfig::default());
    sort_chronologically(&mut by_date);

    println!("Positive long calls by day:");
    for day in &by_date {
        println!("  {}: {} calls, {} qualified", day.date, day.total, day.qualified);
    }

    println!("\nBy outcome:");
    for (group, count) in group_by_outcome(&filtered).entries() {
        println!("  {:<10} {}", group.label(), count);
    }

    Ok(())
}
