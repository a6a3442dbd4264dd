//! Common test utilities and helpers for callstat tests
//!
//! This module provides a call record builder, a fixed reference time and
//! helpers for writing call data files.

#![allow(dead_code)]

use callstat::types::{CallId, CallRecord, CallStatus, Outcome};
use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use tempfile::TempDir;

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Every outcome label the dashboard offers, plus the legacy "lost"
pub const TEST_OUTCOMES: &[&str] = &[
    "qualified",
    "not-qualified",
    "closed-won",
    "closed-lost",
    "follow-up",
    "lost",
];

/// Every status label the dashboard offers
pub const TEST_STATUSES: &[&str] = &["completed", "scheduled", "cancelled"];

/// Fixed "now" for date-range tests
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Builder for creating test CallRecord instances
pub struct CallRecordBuilder {
    id: String,
    prospect_name: Option<String>,
    date: DateTime<Utc>,
    duration: u64,
    outcome: String,
    status: Option<String>,
    sentiment_score: f64,
    notes: Option<String>,
    tags: Option<Vec<String>>,
}

impl CallRecordBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            prospect_name: None,
            date: reference_now(),
            duration: 600,
            outcome: "follow-up".to_string(),
            status: Some("completed".to_string()),
            sentiment_score: 0.5,
            notes: None,
            tags: None,
        }
    }

    pub fn with_prospect(mut self, name: &str) -> Self {
        self.prospect_name = Some(name.to_string());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Place the call a number of days before the reference time
    pub fn days_ago(mut self, days: i64) -> Self {
        self.date = reference_now() - Duration::days(days);
        self
    }

    pub fn with_duration(mut self, seconds: u64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_outcome(mut self, outcome: &str) -> Self {
        self.outcome = outcome.to_string();
        self
    }

    pub fn with_status(mut self, status: Option<&str>) -> Self {
        self.status = status.map(str::to_string);
        self
    }

    pub fn with_sentiment(mut self, score: f64) -> Self {
        self.sentiment_score = score;
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    /// Build the CallRecord
    pub fn build(self) -> CallRecord {
        CallRecord {
            id: CallId::new(self.id),
            prospect_name: self.prospect_name,
            date: self.date,
            duration: self.duration,
            outcome: Outcome::from(self.outcome),
            status: self.status.map(CallStatus::from),
            sentiment_score: self.sentiment_score,
            notes: self.notes,
            tags: self.tags,
        }
    }
}

/// The four-call scenario from the dashboard walkthrough
///
/// Outcomes qualified, closed-won, lost and follow-up with sentiments
/// 0.8, 0.7, 0.2 and 0.5.
pub fn walkthrough_calls() -> Vec<CallRecord> {
    vec![
        CallRecordBuilder::new("w-1")
            .with_prospect("Acme Corp")
            .with_outcome("qualified")
            .with_sentiment(0.8)
            .with_duration(420)
            .days_ago(1)
            .build(),
        CallRecordBuilder::new("w-2")
            .with_prospect("Globex")
            .with_outcome("closed-won")
            .with_sentiment(0.7)
            .with_duration(1200)
            .days_ago(3)
            .build(),
        CallRecordBuilder::new("w-3")
            .with_prospect("Initech")
            .with_outcome("lost")
            .with_sentiment(0.2)
            .with_duration(180)
            .days_ago(10)
            .build(),
        CallRecordBuilder::new("w-4")
            .with_prospect("Umbrella")
            .with_outcome("follow-up")
            .with_sentiment(0.5)
            .with_duration(600)
            .with_tags(&["acme-deal"])
            .days_ago(40)
            .build(),
    ]
}

/// Write calls to a JSON file inside a fresh temp dir
///
/// The returned TempDir must be kept alive while the file is used.
pub fn write_calls_file(calls: &[CallRecord], envelope: bool) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calls.json");
    let data = serde_json::to_value(calls).unwrap();
    let body = if envelope {
        serde_json::json!({ "success": true, "data": data })
    } else {
        data
    };
    std::fs::write(&path, body.to_string()).unwrap();
    (dir, path)
}
