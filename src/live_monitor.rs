//! Live monitoring functionality for callstat
//!
//! This module keeps a dashboard on screen and refreshes it when the data
//! changes. File sources are watched with `notify`; HTTP sources are polled
//! on an interval. Lines typed on stdin edit the filters, and every change
//! flows through the debounced `FilterPipeline` before the frame is redrawn.

use crate::error::{CallstatError, Result};
use crate::pagination::Pager;
use crate::pipeline::{DashboardView, FilterPipeline};
use crate::provider::CallSource;
use crate::types::CallRecord;
use callstat_terminal::DashboardRenderer;
use chrono::Local;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

// Constants for watcher thread management
const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(100);
const WATCHER_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(200); // 2x poll interval

/// Pause after a file event so the writer can finish
const WRITE_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// A line typed while the dashboard is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Replace the search term; an empty line clears it
    Search(String),
    NextPage,
    PrevPage,
    /// Reset every filter
    ClearFilters,
    /// Fetch the calls again right away
    Refresh,
    Quit,
}

impl MonitorCommand {
    /// Parse one input line
    ///
    /// Lines starting with `:` are commands; anything else is a search term.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(MonitorCommand::Search(line.to_string()));
        };

        match command.trim() {
            "n" | "next" => Ok(MonitorCommand::NextPage),
            "p" | "prev" => Ok(MonitorCommand::PrevPage),
            "c" | "clear" => Ok(MonitorCommand::ClearFilters),
            "r" | "refresh" => Ok(MonitorCommand::Refresh),
            "q" | "quit" => Ok(MonitorCommand::Quit),
            other => Err(CallstatError::InvalidArgument(format!(
                "unknown command ':{other}', expected one of: :next, :prev, :clear, :refresh, :quit"
            ))),
        }
    }
}

/// What triggers a re-fetch
#[derive(Debug, Clone)]
pub enum RefreshTrigger {
    /// Re-fetch when the file changes
    FileChange(PathBuf),
    /// Re-fetch on a fixed interval
    Interval(Duration),
}

/// Live monitoring state
pub struct LiveMonitor {
    source: Arc<dyn CallSource>,
    pipeline: FilterPipeline,
    renderer: DashboardRenderer,
    pager: Pager,
    trigger: RefreshTrigger,
    json_output: bool,
    /// Error shown in the footer until the next successful action
    notice: Option<String>,
}

impl LiveMonitor {
    /// Create a new live monitor
    pub fn new(
        source: Arc<dyn CallSource>,
        pipeline: FilterPipeline,
        renderer: DashboardRenderer,
        trigger: RefreshTrigger,
        json_output: bool,
    ) -> Self {
        Self {
            source,
            pipeline,
            renderer,
            pager: Pager::default(),
            trigger,
            json_output,
            notice: None,
        }
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Start the live monitoring loop
    pub async fn run(mut self) -> Result<()> {
        // The first fetch must succeed; later failures only show in the footer
        let Some(calls) = fetch_or_shutdown(self.source.as_ref()).await? else {
            return Ok(());
        };
        self.pipeline.replace_calls(calls);
        let view = self.pipeline.flush();
        let mut views = self.pipeline.subscribe();
        views.mark_unchanged();
        self.print_frame(&view)?;

        let (change_tx, mut change_rx) = mpsc::channel(10);
        let should_stop = Arc::new(AtomicBool::new(false));
        let mut watcher_handle = match &self.trigger {
            RefreshTrigger::FileChange(path) => Some(spawn_file_watcher(
                path.clone(),
                change_tx,
                should_stop.clone(),
            )),
            RefreshTrigger::Interval(_) => None,
        };

        let period = match &self.trigger {
            RefreshTrigger::Interval(period) => *period,
            // The file watcher drives refreshes; the tick only keeps the clock line fresh
            RefreshTrigger::FileChange(_) => Duration::from_secs(60),
        };
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        let mut input = spawn_input_reader();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if matches!(self.trigger, RefreshTrigger::Interval(_)) {
                        if !self.refetch().await? {
                            break;
                        }
                    } else {
                        self.redraw()?;
                    }
                }
                Some(()) = change_rx.recv() => {
                    tokio::time::sleep(WRITE_SETTLE_DELAY).await;
                    // Collapse events that arrived while settling
                    while change_rx.try_recv().is_ok() {}
                    if !self.refetch().await? {
                        break;
                    }
                }
                Some(line) = input.recv() => {
                    match MonitorCommand::parse(&line) {
                        Ok(MonitorCommand::Quit) => break,
                        Ok(MonitorCommand::Refresh) => {
                            if !self.refetch().await? {
                                break;
                            }
                        }
                        Ok(command) => {
                            let had_notice = self.notice.take().is_some();
                            if self.apply(command) || had_notice {
                                self.redraw()?;
                            }
                        }
                        Err(e) => {
                            self.notice = Some(e.to_string());
                            self.redraw()?;
                        }
                    }
                }
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = views.borrow_and_update().clone();
                    self.print_frame(&view)?;
                }
                _ = tokio::signal::ctrl_c() => {
                    // Graceful shutdown
                    if !self.json_output {
                        println!("\nExiting live monitoring mode...");
                    }
                    break;
                }
            }
        }

        should_stop.store(true, Ordering::Release);
        if let Some(handle) = watcher_handle.as_mut() {
            shutdown_watcher(handle).await;
        }

        Ok(())
    }

    /// Apply a local command, returning whether the frame must be redrawn now
    ///
    /// Filter edits go through the pipeline and redraw once the debounced
    /// view is published; page moves redraw immediately.
    pub fn apply(&mut self, command: MonitorCommand) -> bool {
        let len = self.pipeline.current().calls.len();
        match command {
            MonitorCommand::Search(term) => {
                debug!("Search term changed to {:?}", term);
                self.pipeline
                    .update_criteria(|criteria| criteria.search_term = term);
                false
            }
            MonitorCommand::ClearFilters => {
                self.pipeline.update_criteria(|criteria| criteria.clear());
                false
            }
            MonitorCommand::NextPage => self.pager.next(len),
            MonitorCommand::PrevPage => self.pager.prev(),
            MonitorCommand::Refresh | MonitorCommand::Quit => false,
        }
    }

    /// Fetch again and hand the calls to the pipeline
    ///
    /// Returns `false` when Ctrl-C interrupted the fetch.
    async fn refetch(&mut self) -> Result<bool> {
        match fetch_or_shutdown(self.source.as_ref()).await {
            Ok(Some(calls)) => {
                self.accept_calls(calls);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                warn!("Refresh from {} failed: {}", self.source.describe(), e);
                self.notice = Some(format!("Last refresh failed: {e}"));
                self.redraw()?;
                Ok(true)
            }
        }
    }

    fn accept_calls(&mut self, calls: Vec<CallRecord>) {
        info!("Refreshed {} calls", calls.len());
        self.notice = None;
        self.pipeline.replace_calls(calls);
    }

    fn redraw(&mut self) -> Result<()> {
        let view = self.pipeline.current();
        self.print_frame(&view)
    }

    fn footer(&self) -> String {
        match &self.notice {
            Some(notice) => notice.clone(),
            None => format!(
                "Updated {} | type to search, :n/:p page, :c clear, Ctrl+C to exit",
                Local::now().format("%H:%M:%S")
            ),
        }
    }

    fn print_frame(&mut self, view: &DashboardView) -> Result<()> {
        if self.json_output {
            println!("{}", serde_json::to_string(view)?);
            return Ok(());
        }

        let footer = self.footer();
        let frame = self
            .renderer
            .render(view, self.pipeline.criteria(), &mut self.pager, &footer);
        // Clear screen and move cursor to top-left
        print!("\x1B[2J\x1B[1;1H{frame}");
        Ok(())
    }
}

/// Fetch the calls unless Ctrl-C arrives first
///
/// A cancelled fetch yields `None` and publishes nothing.
pub async fn fetch_or_shutdown(source: &dyn CallSource) -> Result<Option<Vec<CallRecord>>> {
    tokio::select! {
        result = source.fetch_calls() => result.map(Some),
        _ = tokio::signal::ctrl_c() => {
            debug!("Fetch from {} cancelled", source.describe());
            Ok(None)
        }
    }
}

/// Forward stdin lines until input closes
fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("Stopped reading input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Watch the directory holding `path` and signal when the file changes
///
/// The parent directory is watched so editors that replace the file are
/// still noticed.
fn spawn_file_watcher(
    path: PathBuf,
    tx: mpsc::Sender<()>,
    should_stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<Result<()>> {
    tokio::task::spawn_blocking(move || -> Result<()> {
        let file_name = path.file_name().map(|name| name.to_os_string());
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                if let Ok(event) = result
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                    && event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name)
                {
                    let _ = tx.try_send(());
                }
            },
            Config::default(),
        )
        .map_err(|e| CallstatError::Watch(format!("Failed to create file watcher: {e}")))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                CallstatError::Watch(format!("Failed to watch {}: {e}", dir.display()))
            })?;
        debug!("Watching {} for changes", dir.display());

        // Keep the watcher alive until we're told to stop
        while !should_stop.load(Ordering::Acquire) {
            std::thread::sleep(WATCHER_POLL_INTERVAL);
        }

        drop(watcher);
        Ok(())
    })
}

/// Wait for the watcher task, aborting it if it does not stop in time
async fn shutdown_watcher(handle: &mut tokio::task::JoinHandle<Result<()>>) {
    tokio::select! {
        res = &mut *handle => {
            match res {
                Ok(Ok(())) => debug!("Watcher task exited gracefully"),
                Ok(Err(e)) => warn!("Watcher task exited with an error: {}", e),
                Err(e) if e.is_panic() => warn!("Watcher task panicked: {:?}", e),
                Err(e) => warn!("Watcher task was cancelled: {}", e),
            }
        }
        _ = tokio::time::sleep(WATCHER_SHUTDOWN_TIMEOUT) => {
            handle.abort();
            warn!("Watcher task was aborted because it did not shut down gracefully in time");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::TimezoneConfig;
    use crate::types::{CallId, Outcome};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::AtomicUsize;

    fn calls(count: usize) -> Vec<CallRecord> {
        (0..count)
            .map(|i| CallRecord {
                id: CallId::new(format!("c{i}")),
                prospect_name: Some(if i == 0 {
                    "Acme Corp".to_string()
                } else {
                    format!("Prospect {i}")
                }),
                date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                duration: 300,
                outcome: Outcome::Qualified,
                status: None,
                sentiment_score: 0.5,
                notes: None,
                tags: None,
            })
            .collect()
    }

    struct CountingSource {
        calls: Vec<CallRecord>,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl CallSource for CountingSource {
        async fn fetch_calls(&self) -> Result<Vec<CallRecord>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.calls.clone())
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn monitor(count: usize) -> LiveMonitor {
        let source = Arc::new(CountingSource {
            calls: calls(count),
            fetches: AtomicUsize::new(0),
        });
        let mut pipeline = FilterPipeline::tokio(calls(count), TimezoneConfig::utc())
            .unwrap()
            .with_debounce(Duration::from_millis(300));
        pipeline.flush();
        LiveMonitor::new(
            source,
            pipeline,
            DashboardRenderer::plain(80, TimezoneConfig::utc()),
            RefreshTrigger::Interval(Duration::from_secs(30)),
            false,
        )
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            MonitorCommand::parse("  acme ").unwrap(),
            MonitorCommand::Search("acme".to_string())
        );
        assert_eq!(
            MonitorCommand::parse("").unwrap(),
            MonitorCommand::Search(String::new())
        );
        assert_eq!(MonitorCommand::parse(":n").unwrap(), MonitorCommand::NextPage);
        assert_eq!(MonitorCommand::parse(":prev").unwrap(), MonitorCommand::PrevPage);
        assert_eq!(MonitorCommand::parse(":clear").unwrap(), MonitorCommand::ClearFilters);
        assert_eq!(MonitorCommand::parse(":r").unwrap(), MonitorCommand::Refresh);
        assert_eq!(MonitorCommand::parse(":q").unwrap(), MonitorCommand::Quit);
        assert!(matches!(
            MonitorCommand::parse(":bogus"),
            Err(CallstatError::InvalidArgument(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_goes_through_debounce() {
        let mut monitor = monitor(3);
        let mut views = monitor.pipeline().subscribe();
        views.mark_unchanged();

        assert!(!monitor.apply(MonitorCommand::Search("ac".to_string())));
        assert!(!monitor.apply(MonitorCommand::Search("acme".to_string())));
        assert!(monitor.pipeline().is_pending());

        views.changed().await.unwrap();
        let view = views.borrow_and_update().clone();
        assert_eq!(view.calls.len(), 1);
        assert_eq!(view.calls[0].id.as_str(), "c0");
        assert_eq!(monitor.pipeline().criteria().search_term, "acme");
    }

    #[tokio::test]
    async fn test_page_commands() {
        let mut monitor = monitor(8);

        assert!(!monitor.apply(MonitorCommand::PrevPage));
        assert!(monitor.apply(MonitorCommand::NextPage));
        assert_eq!(monitor.pager().page(), 1);
        assert!(!monitor.apply(MonitorCommand::NextPage));
        assert!(monitor.apply(MonitorCommand::PrevPage));
        assert_eq!(monitor.pager().page(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_filters() {
        let mut monitor = monitor(3);
        monitor.apply(MonitorCommand::Search("acme".to_string()));
        monitor.apply(MonitorCommand::ClearFilters);
        assert!(!monitor.pipeline().criteria().has_active_filters());
    }

    #[tokio::test]
    async fn test_fetch_or_shutdown_returns_calls() {
        let source = CountingSource {
            calls: calls(2),
            fetches: AtomicUsize::new(0),
        };
        let fetched = fetch_or_shutdown(&source).await.unwrap();
        assert_eq!(fetched.map(|c| c.len()), Some(2));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refetch_replaces_calls() {
        let mut monitor = monitor(2);
        assert_eq!(monitor.pipeline().calls().len(), 2);

        let bigger: Arc<dyn CallSource> = Arc::new(CountingSource {
            calls: calls(5),
            fetches: AtomicUsize::new(0),
        });
        monitor.source = bigger;
        assert!(monitor.refetch().await.unwrap());
        assert_eq!(monitor.pipeline().calls().len(), 5);
        assert!(monitor.notice.is_none());
    }

    #[test]
    fn test_watcher_constants_validity() {
        assert!(WATCHER_SHUTDOWN_TIMEOUT >= WATCHER_POLL_INTERVAL * 2);
        assert!(WRITE_SETTLE_DELAY > WATCHER_POLL_INTERVAL);
    }
}
