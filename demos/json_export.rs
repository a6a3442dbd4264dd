//! Example of exporting callstat data to JSON
//!
//! This example computes the full dashboard view for a search term and
//! writes it to `dashboard.json`.

use callstat::{
    Result,
    filters::FilterCriteria,
    pipeline::FilterPipeline,
    report::load_calls,
    timezone::TimezoneConfig,
};
use callstat_source::open_source;
use std::fs;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let file = std::env::var_os("CALLSTAT_DATA_FILE").map(PathBuf::from);
    let source = open_source(None, file.as_deref())?;

    println!("Loading calls...");
    let calls = load_calls(source.as_ref(), false).await?;

    let search = std::env::args().nth(1).unwrap_or_default();
    let mut pipeline = FilterPipeline::tokio(calls, TimezoneConfig::default())?
        .with_criteria(FilterCriteria::new().with_search(search));

    // Skip the debounce window; we only need one view
    let view = pipeline.flush();

    let json = serde_json::to_string_pretty(&*view)?;
    fs::write("dashboard.json", json)?;

    println!(
        "Exported {} matching calls across {} days to dashboard.json",
        view.calls.len(),
        view.by_date.len()
    );

    Ok(())
}
