//! callstat - Search, filter and summarize sales-call records

use callstat::{
    cli::{Cli, Command, WatchSettings},
    error::Result,
    live_monitor::{LiveMonitor, RefreshTrigger},
    pipeline::FilterPipeline,
    provider::CallSource,
    report::{calls_report, charts_report, load_calls, summary_report},
    timezone::TimezoneConfig,
};
use callstat_source::open_source;
use callstat_terminal::{DashboardRenderer, get_formatter};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log targets enabled by --verbose
const VERBOSE_FILTER: &str =
    "callstat=info,callstat_core=info,callstat_source=info,callstat_terminal=info";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Quiet by default; RUST_LOG only applies together with --verbose
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(VERBOSE_FILTER))
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.clone().unwrap_or(Command::Summary);
    command.validate()?;

    let criteria = cli.filters.to_criteria()?;
    let timezone = TimezoneConfig::from_cli(cli.timezone.timezone.as_deref(), cli.timezone.utc)?;
    info!("Using timezone: {}", timezone.display_name());

    let source: Arc<dyn CallSource> = Arc::from(open_source(
        cli.source.api_url.as_deref(),
        cli.source.file.as_deref(),
    )?);

    let (interval, debounce_ms) = match command {
        Command::Watch {
            interval,
            debounce_ms,
        } => (interval, debounce_ms),
        report => {
            let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
            let calls = load_calls(source.as_ref(), show_progress).await?;
            let formatter = get_formatter(cli.json, timezone);

            let output = match report {
                Command::Calls { page, page_size } => {
                    calls_report(&calls, &criteria, page, page_size, formatter.as_ref())?
                }
                Command::Charts { chronological } => {
                    charts_report(&calls, &criteria, &timezone, chronological, formatter.as_ref())
                }
                _ => summary_report(&calls, &criteria, formatter.as_ref()),
            };
            println!("{output}");
            return Ok(());
        }
    };

    info!("Starting live monitoring mode");
    let settings = WatchSettings::new(interval, debounce_ms);
    let trigger = match &cli.source.file {
        Some(path) => RefreshTrigger::FileChange(path.clone()),
        None => RefreshTrigger::Interval(settings.interval),
    };
    let pipeline = FilterPipeline::tokio(Vec::new(), timezone)?
        .with_debounce(settings.debounce)
        .with_criteria(criteria);
    let monitor = LiveMonitor::new(
        source,
        pipeline,
        DashboardRenderer::new(timezone),
        trigger,
        cli.json,
    );
    monitor.run().await
}
