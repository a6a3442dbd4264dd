//! Shared test utilities for unit tests
//!
//! Integration tests in `tests/` cannot see this module; they carry their
//! own builder in `tests/common/mod.rs`.

use crate::types::{CallId, CallRecord, CallStatus, Outcome};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use std::env;

// Serializes environment variable modifications across tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// RAII guard restoring environment variables on drop
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set a variable, remembering its previous value
    pub fn set(&mut self, key: &str, value: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        // env::set_var is unsafe since edition 2024
        unsafe {
            env::set_var(key, value);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed reference instant used by date-sensitive tests
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Builder for call records in unit tests
pub struct CallBuilder {
    record: CallRecord,
}

impl CallBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            record: CallRecord {
                id: CallId::new(id),
                prospect_name: None,
                date: reference_now(),
                duration: 600,
                outcome: Outcome::FollowUp,
                status: Some(CallStatus::Completed),
                sentiment_score: 0.5,
                notes: None,
                tags: None,
            },
        }
    }

    pub fn prospect(mut self, name: &str) -> Self {
        self.record.prospect_name = Some(name.to_string());
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.record.date = date;
        self
    }

    pub fn duration(mut self, seconds: u64) -> Self {
        self.record.duration = seconds;
        self
    }

    pub fn outcome(mut self, outcome: &str) -> Self {
        self.record.outcome = Outcome::from(outcome);
        self
    }

    pub fn status(mut self, status: Option<&str>) -> Self {
        self.record.status = status.map(CallStatus::from);
        self
    }

    pub fn sentiment(mut self, score: f64) -> Self {
        self.record.sentiment_score = score;
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.record.notes = Some(notes.to_string());
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.record.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn build(self) -> CallRecord {
        self.record
    }
}
