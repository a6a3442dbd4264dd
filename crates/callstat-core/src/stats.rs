//! Summary statistics over a set of calls
//!
//! [`summarize`] folds the calls into the four dashboard headline numbers.
//! Every value is defined for an empty input (all zero) and kept at full
//! precision; formatters do the rounding.
//!
//! # Examples
//!
//! ```
//! use callstat_core::stats::summarize;
//!
//! let stats = summarize(&[]);
//! assert_eq!(stats.total_calls, 0);
//! assert_eq!(stats.qualified_rate_percent, 0.0);
//! ```

use crate::types::CallRecord;
use serde::{Deserialize, Serialize};

/// Headline statistics of a call set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CallStats {
    /// Number of calls
    pub total_calls: usize,
    /// Mean call length in minutes
    pub avg_duration_minutes: f64,
    /// Share of qualified or closed-won calls, 0 to 100
    pub qualified_rate_percent: f64,
    /// Mean sentiment score scaled by 100
    pub avg_sentiment_percent: f64,
}

/// Running sums for [`CallStats`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAccumulator {
    count: usize,
    duration_minutes: f64,
    qualified: usize,
    sentiment: f64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_call(&mut self, call: &CallRecord) {
        self.count += 1;
        self.duration_minutes += call.duration_minutes();
        self.sentiment += call.sentiment_score;
        if call.outcome.is_qualified() {
            self.qualified += 1;
        }
    }

    pub fn finish(self) -> CallStats {
        if self.count == 0 {
            return CallStats::default();
        }

        let count = self.count as f64;
        CallStats {
            total_calls: self.count,
            avg_duration_minutes: self.duration_minutes / count,
            qualified_rate_percent: self.qualified as f64 * 100.0 / count,
            avg_sentiment_percent: self.sentiment * 100.0 / count,
        }
    }
}

impl<'a> Extend<&'a CallRecord> for StatsAccumulator {
    fn extend<I: IntoIterator<Item = &'a CallRecord>>(&mut self, calls: I) {
        for call in calls {
            self.add_call(call);
        }
    }
}

/// Compute the headline statistics of `calls`
pub fn summarize(calls: &[CallRecord]) -> CallStats {
    let mut acc = StatsAccumulator::new();
    acc.extend(calls);
    acc.finish()
}
