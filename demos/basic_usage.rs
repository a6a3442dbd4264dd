//! Basic usage example for the callstat library
//!
//! This example loads calls from the API (or the file named by
//! `CALLSTAT_DATA_FILE`) and prints the dashboard stat cards.

use callstat::{Result, report::load_calls, stats::summarize};
use callstat_source::open_source;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let file = std::env::var_os("CALLSTAT_DATA_FILE").map(PathBuf::from);
    let source = open_source(None, file.as_deref())?;
    println!("Loading calls from {}", source.describe());

    let calls = load_calls(source.as_ref(), false).await?;
    let stats = summarize(&calls);

    println!("\nDashboard Summary:");
    println!("==================");
    println!("Total calls:    {}", stats.total_calls);
    println!("Avg duration:   {:.0}m", stats.avg_duration_minutes);
    println!("Qualified rate: {:.0}%", stats.qualified_rate_percent);
    println!("Avg sentiment:  {:.0}%", stats.avg_sentiment_percent);

    Ok(())
}
