//! Filter pipeline
//!
//! [`filter_calls`] is the pure pass: the ordered subset of calls accepted by
//! the criteria. [`FilterPipeline`] wraps it for interactive use. It owns the
//! loaded calls and the current criteria, and every change schedules one
//! debounced recomputation. Each recomputation publishes a fresh
//! [`DashboardView`] on a `tokio::sync::watch` channel.
//!
//! # Examples
//!
//! ```
//! use callstat_core::filters::FilterCriteria;
//! use callstat_core::pipeline::filter_calls;
//!
//! let filtered = filter_calls(&[], &FilterCriteria::new().with_search("acme"));
//! assert!(filtered.is_empty());
//! ```

use crate::debounce::{Debouncer, Scheduler, TokioScheduler};
use crate::error::Result;
use crate::filters::FilterCriteria;
use crate::grouping::{
    DailyCallCount, OutcomeDistribution, SentimentByOutcome, avg_sentiment_by_outcome,
    group_by_date, group_by_outcome,
};
use crate::stats::{CallStats, summarize};
use crate::timezone::TimezoneConfig;
use crate::types::CallRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Quiet period before a criteria change is applied
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Calls accepted by `criteria`, in input order
pub fn filter_calls(calls: &[CallRecord], criteria: &FilterCriteria) -> Vec<CallRecord> {
    filter_calls_at(calls, criteria, Utc::now())
}

/// Calls accepted by `criteria` at the reference time `now`
pub fn filter_calls_at(
    calls: &[CallRecord],
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Vec<CallRecord> {
    let matcher = criteria.matcher(now);
    calls
        .iter()
        .filter(|call| matcher.matches(call))
        .cloned()
        .collect()
}

/// Everything the dashboard shows for one filter state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Increases by one with every published view; 0 before the first
    pub generation: u64,
    /// Filtered calls in input order
    pub calls: Vec<CallRecord>,
    pub stats: CallStats,
    /// Calls per day, in first-seen order
    pub by_date: Vec<DailyCallCount>,
    pub outcomes: OutcomeDistribution,
    pub sentiment_by_outcome: SentimentByOutcome,
}

impl DashboardView {
    /// View shown before anything has been computed
    pub fn empty() -> Self {
        Self::from_filtered(0, Vec::new(), &TimezoneConfig::utc())
    }

    /// Filter `calls` and derive every chart and statistic
    pub fn compute(
        generation: u64,
        calls: &[CallRecord],
        criteria: &FilterCriteria,
        timezone: &TimezoneConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self::from_filtered(generation, filter_calls_at(calls, criteria, now), timezone)
    }

    fn from_filtered(generation: u64, calls: Vec<CallRecord>, timezone: &TimezoneConfig) -> Self {
        Self {
            generation,
            stats: summarize(&calls),
            by_date: group_by_date(&calls, timezone),
            outcomes: group_by_outcome(&calls),
            sentiment_by_outcome: avg_sentiment_by_outcome(&calls),
            calls,
        }
    }
}

/// Source of the reference time for date-range filters
pub type Clock = fn() -> DateTime<Utc>;

/// Snapshot of the pipeline inputs taken when a recomputation is scheduled
struct Recompute {
    calls: Arc<[CallRecord]>,
    criteria: FilterCriteria,
    timezone: TimezoneConfig,
    clock: Clock,
    generation: Arc<AtomicU64>,
    sender: Arc<watch::Sender<Arc<DashboardView>>>,
}

impl Recompute {
    fn publish(self) -> Arc<DashboardView> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let view = Arc::new(DashboardView::compute(
            generation,
            &self.calls,
            &self.criteria,
            &self.timezone,
            (self.clock)(),
        ));

        debug!(
            generation,
            total = self.calls.len(),
            matched = view.calls.len(),
            active_filters = self.criteria.active_filter_count(),
            "Recomputed dashboard view"
        );

        // A slower, older recomputation must not overwrite a newer view
        let published = view.clone();
        self.sender.send_if_modified(move |current| {
            if published.generation > current.generation {
                *current = published;
                true
            } else {
                false
            }
        });
        view
    }
}

/// Debounced recomputation of the dashboard view
///
/// # Examples
///
/// ```
/// use callstat_core::filters::FilterCriteria;
/// use callstat_core::pipeline::FilterPipeline;
/// use callstat_core::timezone::TimezoneConfig;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> callstat_core::Result<()> {
/// let mut pipeline = FilterPipeline::tokio(Vec::new(), TimezoneConfig::utc())?;
/// pipeline.set_criteria(FilterCriteria::new().with_search("acme"));
///
/// // Skip the quiet period
/// let view = pipeline.flush();
/// assert_eq!(view.generation, 1);
/// assert!(view.calls.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct FilterPipeline {
    calls: Arc<[CallRecord]>,
    criteria: FilterCriteria,
    timezone: TimezoneConfig,
    clock: Clock,
    debouncer: Debouncer<Arc<dyn Scheduler>>,
    generation: Arc<AtomicU64>,
    sender: Arc<watch::Sender<Arc<DashboardView>>>,
}

impl FilterPipeline {
    pub fn new(
        calls: Vec<CallRecord>,
        timezone: TimezoneConfig,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let (sender, _) = watch::channel(Arc::new(DashboardView::empty()));
        Self {
            calls: calls.into(),
            criteria: FilterCriteria::default(),
            timezone,
            clock: Utc::now,
            debouncer: Debouncer::new(scheduler, DEFAULT_DEBOUNCE),
            generation: Arc::new(AtomicU64::new(0)),
            sender: Arc::new(sender),
        }
    }

    /// Pipeline scheduling its timers on the current tokio runtime
    pub fn tokio(calls: Vec<CallRecord>, timezone: TimezoneConfig) -> Result<Self> {
        let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::current()?);
        Ok(Self::new(calls, timezone, scheduler))
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debouncer.set_delay(delay);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn timezone(&self) -> &TimezoneConfig {
        &self.timezone
    }

    /// Receiver of every published view
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardView>> {
        self.sender.subscribe()
    }

    /// Most recently published view
    pub fn current(&self) -> Arc<DashboardView> {
        self.sender.borrow().clone()
    }

    /// Whether a recomputation is waiting for its quiet period to end
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Replace the criteria and schedule a recomputation
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.schedule();
    }

    /// Edit the criteria in place and schedule a recomputation
    pub fn update_criteria<F>(&mut self, update: F)
    where
        F: FnOnce(&mut FilterCriteria),
    {
        update(&mut self.criteria);
        self.schedule();
    }

    /// Swap in a freshly fetched collection and schedule a recomputation
    pub fn replace_calls(&mut self, calls: Vec<CallRecord>) {
        self.calls = calls.into();
        self.schedule();
    }

    /// Cancel any pending recomputation and recompute right away
    pub fn flush(&mut self) -> Arc<DashboardView> {
        self.debouncer.cancel();
        self.snapshot().publish()
    }

    fn schedule(&mut self) {
        let job = self.snapshot();
        self.debouncer.call(move || {
            job.publish();
        });
    }

    fn snapshot(&self) -> Recompute {
        Recompute {
            calls: self.calls.clone(),
            criteria: self.criteria.clone(),
            timezone: self.timezone,
            clock: self.clock,
            generation: self.generation.clone(),
            sender: self.sender.clone(),
        }
    }
}
