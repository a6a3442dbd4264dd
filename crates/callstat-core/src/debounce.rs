//! Cancellable delayed work
//!
//! A [`Debouncer`] delays a callback until a quiet period has passed. Each
//! new call cancels the previously scheduled callback, so only the most
//! recent one ever runs. Timers come from a [`Scheduler`], which lets tests
//! drive time by hand while production code uses [`TokioScheduler`].

use crate::error::{CallstatError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::trace;

/// Work run when a timer fires
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Source of cancellable one-shot timers
pub trait Scheduler: Send + Sync {
    /// Run `callback` once after `delay` unless the returned handle is cancelled first
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        (**self).schedule(delay, callback)
    }
}

#[derive(Debug, Default)]
struct TimerState {
    cancelled: AtomicBool,
    fired: AtomicBool,
}

/// Handle to a scheduled timer
///
/// Dropping the handle leaves the timer running; call [`TimerHandle::cancel`]
/// to stop it.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    state: Arc<TimerState>,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    /// Handle not yet bound to a runtime task
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the task that sleeps until the deadline
    pub fn with_abort_handle(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Cancel the timer; a no-op once it has fired
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    pub fn has_fired(&self) -> bool {
        self.state.fired.load(Ordering::Acquire)
    }

    /// Whether the callback may still run
    pub fn is_pending(&self) -> bool {
        !self.is_cancelled() && !self.has_fired()
    }

    /// Run the callback at the deadline unless the timer was cancelled
    ///
    /// Scheduler implementations call this when the delay has elapsed.
    /// Returns whether the callback ran.
    pub fn fire(&self, callback: TimerCallback) -> bool {
        if self.is_cancelled() || self.state.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        callback();
        true
    }
}

/// Scheduler backed by tokio tasks and `tokio::time::sleep`
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime the caller is running in
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| CallstatError::Config(format!("no tokio runtime available: {e}")))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle::new();
        let timer = handle.clone();
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if !timer.fire(callback) {
                trace!("Timer cancelled before firing");
            }
        });
        handle.with_abort_handle(task.abort_handle())
    }
}

/// Keeps at most one pending callback, restarting the delay on every call
///
/// # Examples
///
/// ```
/// use callstat_core::debounce::{Debouncer, TokioScheduler};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> callstat_core::Result<()> {
/// let runs = Arc::new(AtomicUsize::new(0));
/// let mut debouncer = Debouncer::new(TokioScheduler::current()?, Duration::from_millis(10));
///
/// for _ in 0..5 {
///     let runs = runs.clone();
///     debouncer.call(move || {
///         runs.fetch_add(1, Ordering::SeqCst);
///     });
/// }
///
/// tokio::time::sleep(Duration::from_millis(50)).await;
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
/// # Ok(())
/// # }
/// ```
pub struct Debouncer<S: Scheduler> {
    scheduler: S,
    delay: Duration,
    pending: Option<TimerHandle>,
}

impl<S: Scheduler> Debouncer<S> {
    pub fn new(scheduler: S, delay: Duration) -> Self {
        Self {
            scheduler,
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the quiet period for subsequent calls
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedule `callback`, cancelling whatever was pending
    pub fn call<F>(&mut self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(self.scheduler.schedule(self.delay, Box::new(callback)));
    }

    /// Cancel the pending callback, returning whether one was still waiting
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_pending = handle.is_pending();
                handle.cancel();
                was_pending
            }
            None => false,
        }
    }

    /// Whether a callback is scheduled and has not run yet
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(TimerHandle::is_pending)
    }
}

impl<S: Scheduler> Drop for Debouncer<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}
