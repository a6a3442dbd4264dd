//! Core domain types for callstat
//!
//! This module contains the call record model and the small strongly-typed
//! wrappers around it: call identifiers, outcomes, statuses and calendar
//! dates used for bucketing. Records mirror the JSON shape served by the
//! `/api/calls` endpoint (camelCase field names).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{CallstatError, Result};

/// Strongly-typed call identifier
///
/// # Examples
/// ```
/// use callstat_core::types::CallId;
///
/// let id = CallId::new("call-001");
/// assert_eq!(id.as_str(), "call-001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    /// Create a new CallId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CallId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of a sales call
///
/// Unknown labels are kept verbatim in [`Outcome::Other`] so that equality
/// filters still see the raw value, while grouping folds them into the
/// synthetic "other" bucket.
///
/// # Examples
/// ```
/// use callstat_core::types::{Outcome, OutcomeGroup};
///
/// let outcome = Outcome::from("closed-won");
/// assert!(outcome.is_qualified());
///
/// let odd = Outcome::from("voicemail");
/// assert_eq!(odd.as_str(), "voicemail");
/// assert_eq!(odd.group(), OutcomeGroup::Other);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Outcome {
    Qualified,
    NotQualified,
    ClosedWon,
    ClosedLost,
    FollowUp,
    Lost,
    /// Any label outside the known set, preserved as received
    Other(String),
}

impl Outcome {
    /// The wire label of this outcome
    pub fn as_str(&self) -> &str {
        match self {
            Self::Qualified => "qualified",
            Self::NotQualified => "not-qualified",
            Self::ClosedWon => "closed-won",
            Self::ClosedLost => "closed-lost",
            Self::FollowUp => "follow-up",
            Self::Lost => "lost",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the call counts towards the qualified rate
    pub fn is_qualified(&self) -> bool {
        matches!(self, Self::Qualified | Self::ClosedWon)
    }

    /// Three-way grouping used by the outcome distribution chart
    pub fn group(&self) -> OutcomeGroup {
        match self {
            Self::Qualified | Self::ClosedWon => OutcomeGroup::Qualified,
            Self::Lost => OutcomeGroup::Lost,
            _ => OutcomeGroup::Other,
        }
    }

    /// Four-way bucket used by the sentiment-by-outcome chart
    pub fn bucket(&self) -> OutcomeBucket {
        match self {
            Self::Qualified => OutcomeBucket::Qualified,
            Self::ClosedWon => OutcomeBucket::ClosedWon,
            Self::Lost => OutcomeBucket::Lost,
            _ => OutcomeBucket::Other,
        }
    }
}

impl From<&str> for Outcome {
    fn from(label: &str) -> Self {
        match label {
            "qualified" => Self::Qualified,
            "not-qualified" => Self::NotQualified,
            "closed-won" => Self::ClosedWon,
            "closed-lost" => Self::ClosedLost,
            "follow-up" => Self::FollowUp,
            "lost" => Self::Lost,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Outcome {
    fn from(label: String) -> Self {
        match Self::from(label.as_str()) {
            Self::Other(_) => Self::Other(label),
            known => known,
        }
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome groups of the distribution chart
///
/// Every outcome falls into exactly one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeGroup {
    Qualified,
    Lost,
    Other,
}

impl OutcomeGroup {
    /// All groups in chart order
    pub const ALL: [OutcomeGroup; 3] = [Self::Qualified, Self::Lost, Self::Other];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Qualified => "Qualified",
            Self::Lost => "Lost",
            Self::Other => "Other",
        }
    }
}

/// Outcome buckets of the sentiment-by-outcome chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeBucket {
    Qualified,
    ClosedWon,
    Lost,
    Other,
}

impl OutcomeBucket {
    /// All buckets in chart order
    pub const ALL: [OutcomeBucket; 4] = [Self::Qualified, Self::ClosedWon, Self::Lost, Self::Other];

    /// Wire label of the bucket
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qualified => "qualified",
            Self::ClosedWon => "closed-won",
            Self::Lost => "lost",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for OutcomeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CallStatus {
    Completed,
    Scheduled,
    Cancelled,
    /// Unrecognized status, preserved as received
    Other(String),
}

impl CallStatus {
    /// The wire label of this status
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Scheduled => "scheduled",
            Self::Cancelled => "cancelled",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for CallStatus {
    fn from(label: &str) -> Self {
        match label {
            "completed" => Self::Completed,
            "scheduled" => Self::Scheduled,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for CallStatus {
    fn from(label: String) -> Self {
        match Self::from(label.as_str()) {
            Self::Other(_) => Self::Other(label),
            known => known,
        }
    }
}

impl From<CallStatus> for String {
    fn from(status: CallStatus) -> Self {
        match status {
            CallStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged sales call
///
/// Records are never mutated after they are fetched; every derived value
/// (filtered subsets, statistics, chart series) is computed from them.
/// Sentiment scores outside `[0, 1]` are accepted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Unique identifier
    pub id: CallId,
    /// Prospect the call was made to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prospect_name: Option<String>,
    /// When the call took place
    #[serde(with = "call_date")]
    pub date: DateTime<Utc>,
    /// Duration in seconds
    pub duration: u64,
    /// Call outcome
    pub outcome: Outcome,
    /// Lifecycle status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CallStatus>,
    /// Sentiment score, 1.0 being the most positive
    pub sentiment_score: f64,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Ordered tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl CallRecord {
    /// Duration in fractional minutes
    pub fn duration_minutes(&self) -> f64 {
        self.duration as f64 / 60.0
    }

    /// Calendar date of the call in the given timezone
    pub fn daily_date(&self, tz: &Tz) -> DailyDate {
        DailyDate::new(self.date.with_timezone(tz).date_naive())
    }

    /// Tags as a slice, empty when the record carries none
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

/// Calendar date used as a bucket key for time series
///
/// # Examples
/// ```
/// use callstat_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let daily = DailyDate::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
/// assert_eq!(daily.to_string(), "2024-03-09");
/// assert_eq!(daily.format("%b %d"), "Mar 09");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Response envelope of the call API
///
/// ```json
/// { "success": false, "error": "Database unavailable" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Payload, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable error, present on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wrap a payload in a success envelope
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Build a failure envelope
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwrap the payload or turn the envelope into a fetch error
    ///
    /// A success envelope without data is treated as a failure.
    pub fn into_result(self) -> Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(CallstatError::fetch(self.error)),
        }
    }
}

/// Serde adapter for call dates
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.fff]` values
/// (taken as UTC) and bare `YYYY-MM-DD` dates (midnight UTC). Always
/// serializes as RFC 3339.
pub mod call_date {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid call date '{raw}'")))
    }

    /// Parse a call date in any of the accepted forms
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}
