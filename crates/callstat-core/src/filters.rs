//! Filtering module for call records
//!
//! A [`FilterCriteria`] is a snapshot of what the user asked for: a free-text
//! search term plus five selectors (outcome, status, sentiment bucket,
//! duration bucket and date range). Every selector defaults to "all" and all
//! active selectors are combined with a logical AND.
//!
//! # Examples
//!
//! ```
//! use callstat_core::filters::{DateRange, FilterCriteria, SentimentBucket};
//!
//! let criteria = FilterCriteria::new()
//!     .with_search("acme")
//!     .with_sentiment(SentimentBucket::Positive)
//!     .with_date_range(DateRange::Last30Days);
//!
//! assert!(criteria.has_active_filters());
//! assert_eq!(criteria.active_filter_count(), 3);
//! ```

use crate::error::{CallstatError, Result};
use crate::types::CallRecord;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selector value meaning "no restriction"
pub const ALL: &str = "all";

/// Sentiment bucket of a call
///
/// Scores above 0.6 are positive and scores below 0.4 negative; both
/// boundary values themselves are neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBucket {
    Positive,
    Neutral,
    Negative,
}

impl SentimentBucket {
    /// Scores strictly above this are positive
    pub const POSITIVE_ABOVE: f64 = 0.6;
    /// Scores strictly below this are negative
    pub const NEGATIVE_BELOW: f64 = 0.4;

    /// Classify a sentiment score
    ///
    /// Returns `None` only for NaN, which belongs to no bucket.
    ///
    /// ```
    /// use callstat_core::filters::SentimentBucket;
    ///
    /// assert_eq!(SentimentBucket::classify(0.61), Some(SentimentBucket::Positive));
    /// assert_eq!(SentimentBucket::classify(0.6), Some(SentimentBucket::Neutral));
    /// assert_eq!(SentimentBucket::classify(0.4), Some(SentimentBucket::Neutral));
    /// assert_eq!(SentimentBucket::classify(0.39), Some(SentimentBucket::Negative));
    /// ```
    pub fn classify(score: f64) -> Option<Self> {
        if score > Self::POSITIVE_ABOVE {
            Some(Self::Positive)
        } else if score < Self::NEGATIVE_BELOW {
            Some(Self::Negative)
        } else if (Self::NEGATIVE_BELOW..=Self::POSITIVE_ABOVE).contains(&score) {
            Some(Self::Neutral)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

/// Duration bucket of a call, by whole call length in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationBucket {
    /// Under 5 minutes
    Short,
    /// 5 to 15 minutes, both inclusive
    Medium,
    /// Over 15 minutes
    Long,
}

impl DurationBucket {
    pub const SHORT_BELOW_MINUTES: f64 = 5.0;
    pub const LONG_ABOVE_MINUTES: f64 = 15.0;

    /// Classify a duration given in seconds
    ///
    /// ```
    /// use callstat_core::filters::DurationBucket;
    ///
    /// assert_eq!(DurationBucket::classify(299), DurationBucket::Short);
    /// assert_eq!(DurationBucket::classify(300), DurationBucket::Medium);
    /// assert_eq!(DurationBucket::classify(900), DurationBucket::Medium);
    /// assert_eq!(DurationBucket::classify(901), DurationBucket::Long);
    /// ```
    pub fn classify(duration_seconds: u64) -> Self {
        let minutes = duration_seconds as f64 / 60.0;
        if minutes < Self::SHORT_BELOW_MINUTES {
            Self::Short
        } else if minutes > Self::LONG_ABOVE_MINUTES {
            Self::Long
        } else {
            Self::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

/// Relative date window ending now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateRange {
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "90days")]
    Last90Days,
}

impl DateRange {
    /// Window length in days
    pub fn days(&self) -> i64 {
        match self {
            Self::Last7Days => 7,
            Self::Last30Days => 30,
            Self::Last90Days => 90,
        }
    }

    /// Earliest instant still inside the window
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last7Days => "7days",
            Self::Last30Days => "30days",
            Self::Last90Days => "90days",
        }
    }
}

macro_rules! selector_text {
    ($ty:ty, $($variant:ident => $label:literal),+ $(,)?) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CallstatError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    other => Err(CallstatError::InvalidArgument(format!(
                        "unknown {} '{}', expected one of: all, {}",
                        stringify!($ty),
                        other,
                        [$($label),+].join(", ")
                    ))),
                }
            }
        }
    };
}

selector_text!(SentimentBucket, Positive => "positive", Neutral => "neutral", Negative => "negative");
selector_text!(DurationBucket, Short => "short", Medium => "medium", Long => "long");
selector_text!(DateRange, Last7Days => "7days", Last30Days => "30days", Last90Days => "90days");

/// Parse a selector, mapping the literal `all` (or an empty string) to `None`
///
/// ```
/// use callstat_core::filters::{parse_selector, DurationBucket};
///
/// assert_eq!(parse_selector::<DurationBucket>("all").unwrap(), None);
/// assert_eq!(parse_selector::<DurationBucket>("long").unwrap(), Some(DurationBucket::Long));
/// assert!(parse_selector::<DurationBucket>("forever").is_err());
/// ```
pub fn parse_selector<T>(raw: &str) -> Result<Option<T>>
where
    T: FromStr<Err = CallstatError>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
        Ok(None)
    } else {
        trimmed.parse().map(Some)
    }
}

/// Parse a free-form label selector (outcome, status)
pub fn parse_label_selector(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Filter criteria for call records
///
/// `None` selectors and an empty search term impose no restriction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring searched in prospect, outcome, notes and tags
    pub search_term: String,
    /// Exact outcome label
    pub outcome: Option<String>,
    /// Exact status label
    pub status: Option<String>,
    /// Sentiment bucket
    pub sentiment: Option<SentimentBucket>,
    /// Duration bucket
    pub duration: Option<DurationBucket>,
    /// Relative date window
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    /// Create criteria with every selector set to "all"
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_sentiment(mut self, bucket: SentimentBucket) -> Self {
        self.sentiment = Some(bucket);
        self
    }

    pub fn with_duration(mut self, bucket: DurationBucket) -> Self {
        self.duration = Some(bucket);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Reset every selector and the search term
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether any selector or the search term restricts the result
    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }

    /// Number of restricting selectors, counting the search term as one
    pub fn active_filter_count(&self) -> usize {
        [
            !self.search_term.is_empty(),
            self.outcome.is_some(),
            self.status.is_some(),
            self.sentiment.is_some(),
            self.duration.is_some(),
            self.date_range.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Check a call against the criteria using the current time
    pub fn matches(&self, call: &CallRecord) -> bool {
        self.matches_at(call, Utc::now())
    }

    /// Check a call against the criteria with an explicit reference time
    pub fn matches_at(&self, call: &CallRecord, now: DateTime<Utc>) -> bool {
        self.matcher(now).matches(call)
    }

    /// Prepare the criteria for evaluating many calls at one instant
    ///
    /// The search term is lowercased and the date cutoff computed once.
    pub fn matcher(&self, now: DateTime<Utc>) -> CriteriaMatcher<'_> {
        CriteriaMatcher {
            criteria: self,
            needle: (!self.search_term.is_empty()).then(|| self.search_term.to_lowercase()),
            cutoff: self.date_range.map(|range| range.cutoff(now)),
        }
    }
}

/// Criteria bound to a reference time, ready to test calls
#[derive(Debug, Clone)]
pub struct CriteriaMatcher<'a> {
    criteria: &'a FilterCriteria,
    needle: Option<String>,
    cutoff: Option<DateTime<Utc>>,
}

impl CriteriaMatcher<'_> {
    /// Check if a call passes every active criterion
    pub fn matches(&self, call: &CallRecord) -> bool {
        if let Some(needle) = &self.needle
            && !Self::matches_search(call, needle)
        {
            return false;
        }

        if let Some(status) = &self.criteria.status {
            // A call without a status never matches a specific status
            match &call.status {
                Some(call_status) if call_status.as_str() == status => {}
                _ => return false,
            }
        }

        if let Some(outcome) = &self.criteria.outcome
            && call.outcome.as_str() != outcome
        {
            return false;
        }

        if let Some(bucket) = self.criteria.sentiment
            && SentimentBucket::classify(call.sentiment_score) != Some(bucket)
        {
            return false;
        }

        if let Some(bucket) = self.criteria.duration
            && DurationBucket::classify(call.duration) != bucket
        {
            return false;
        }

        if let Some(cutoff) = self.cutoff
            && call.date < cutoff
        {
            return false;
        }

        true
    }

    fn matches_search(call: &CallRecord, needle: &str) -> bool {
        let contains = |field: &str| field.to_lowercase().contains(needle);

        call.prospect_name.as_deref().is_some_and(contains)
            || contains(call.outcome.as_str())
            || call.notes.as_deref().is_some_and(contains)
            || call.tags().iter().any(|tag| contains(tag))
    }
}
