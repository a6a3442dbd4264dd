//! Chart series derived from a set of calls
//!
//! Three groupings feed the dashboard charts:
//!
//! - [`group_by_date`]: calls per calendar day, with the qualified subset
//! - [`group_by_outcome`]: the qualified / lost / other distribution
//! - [`avg_sentiment_by_outcome`]: mean sentiment per outcome bucket
//!
//! Date buckets are emitted in the order their first call appears in the
//! input. Use [`sort_chronologically`] when a time axis is needed.

use crate::timezone::TimezoneConfig;
use crate::types::{CallRecord, DailyDate, OutcomeBucket, OutcomeGroup};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Calls on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCallCount {
    pub date: DailyDate,
    pub total: usize,
    pub qualified: usize,
}

/// Group calls by the calendar day they fall on in the configured timezone
///
/// # Examples
///
/// ```
/// use callstat_core::grouping::group_by_date;
/// use callstat_core::timezone::TimezoneConfig;
///
/// assert!(group_by_date(&[], &TimezoneConfig::utc()).is_empty());
/// ```
pub fn group_by_date(calls: &[CallRecord], timezone: &TimezoneConfig) -> Vec<DailyCallCount> {
    let mut index: HashMap<DailyDate, usize> = HashMap::new();
    let mut series: Vec<DailyCallCount> = Vec::new();

    for call in calls {
        let date = timezone.daily_date(&call.date);
        let slot = *index.entry(date).or_insert_with(|| {
            series.push(DailyCallCount {
                date,
                total: 0,
                qualified: 0,
            });
            series.len() - 1
        });

        let day = &mut series[slot];
        day.total += 1;
        if call.outcome.is_qualified() {
            day.qualified += 1;
        }
    }

    series
}

/// Order a date series oldest first
pub fn sort_chronologically(series: &mut [DailyCallCount]) {
    series.sort_by_key(|day| day.date);
}

/// Call counts per outcome group
///
/// The three counts always add up to the number of calls grouped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeDistribution {
    pub qualified: usize,
    pub lost: usize,
    pub other: usize,
}

impl OutcomeDistribution {
    pub fn get(&self, group: OutcomeGroup) -> usize {
        match group {
            OutcomeGroup::Qualified => self.qualified,
            OutcomeGroup::Lost => self.lost,
            OutcomeGroup::Other => self.other,
        }
    }

    pub fn total(&self) -> usize {
        self.qualified + self.lost + self.other
    }

    /// Groups with their counts, in chart order
    pub fn entries(&self) -> impl Iterator<Item = (OutcomeGroup, usize)> + '_ {
        OutcomeGroup::ALL.into_iter().map(|group| (group, self.get(group)))
    }
}

/// Partition calls into qualified, lost and other
pub fn group_by_outcome(calls: &[CallRecord]) -> OutcomeDistribution {
    calls
        .iter()
        .fold(OutcomeDistribution::default(), |mut dist, call| {
            match call.outcome.group() {
                OutcomeGroup::Qualified => dist.qualified += 1,
                OutcomeGroup::Lost => dist.lost += 1,
                OutcomeGroup::Other => dist.other += 1,
            }
            dist
        })
}

/// Mean sentiment of one outcome bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketSentiment {
    pub bucket: OutcomeBucket,
    /// Mean score, 0 when the bucket is empty
    pub avg_sentiment: f64,
    pub calls: usize,
}

/// Mean sentiment for every outcome bucket, in [`OutcomeBucket::ALL`] order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentByOutcome {
    pub buckets: Vec<BucketSentiment>,
}

impl SentimentByOutcome {
    pub fn get(&self, bucket: OutcomeBucket) -> Option<&BucketSentiment> {
        self.buckets.iter().find(|entry| entry.bucket == bucket)
    }

    /// Mean score of a bucket, 0 when it holds no calls
    pub fn average(&self, bucket: OutcomeBucket) -> f64 {
        self.get(bucket).map_or(0.0, |entry| entry.avg_sentiment)
    }
}

impl Default for SentimentByOutcome {
    fn default() -> Self {
        avg_sentiment_by_outcome(&[])
    }
}

/// Average sentiment per outcome bucket
///
/// Every bucket is present in the result, including empty ones.
pub fn avg_sentiment_by_outcome(calls: &[CallRecord]) -> SentimentByOutcome {
    let mut sums = [(0.0_f64, 0_usize); OutcomeBucket::ALL.len()];

    for call in calls {
        let slot = bucket_index(call.outcome.bucket());
        sums[slot].0 += call.sentiment_score;
        sums[slot].1 += 1;
    }

    let buckets = OutcomeBucket::ALL
        .into_iter()
        .zip(sums)
        .map(|(bucket, (sum, count))| BucketSentiment {
            bucket,
            avg_sentiment: if count == 0 { 0.0 } else { sum / count as f64 },
            calls: count,
        })
        .collect();

    SentimentByOutcome { buckets }
}

fn bucket_index(bucket: OutcomeBucket) -> usize {
    match bucket {
        OutcomeBucket::Qualified => 0,
        OutcomeBucket::ClosedWon => 1,
        OutcomeBucket::Lost => 2,
        OutcomeBucket::Other => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CallBuilder;
    use chrono::{TimeZone, Utc};

    fn at(day: u32, hour: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_group_by_date_keeps_first_seen_order() {
        let calls = vec![
            CallBuilder::new("1").date(at(3, 10)).outcome("qualified").build(),
            CallBuilder::new("2").date(at(1, 9)).outcome("lost").build(),
            CallBuilder::new("3").date(at(3, 16)).outcome("closed-won").build(),
            CallBuilder::new("4").date(at(2, 11)).build(),
        ];

        let series = group_by_date(&calls, &TimezoneConfig::utc());
        let dates: Vec<String> = series.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, ["2024-03-03", "2024-03-01", "2024-03-02"]);

        assert_eq!(series[0].total, 2);
        assert_eq!(series[0].qualified, 2);
        assert_eq!(series[1].qualified, 0);
    }

    #[test]
    fn test_sort_chronologically() {
        let calls = vec![
            CallBuilder::new("1").date(at(5, 10)).build(),
            CallBuilder::new("2").date(at(1, 10)).build(),
        ];

        let mut series = group_by_date(&calls, &TimezoneConfig::utc());
        sort_chronologically(&mut series);
        assert_eq!(series[0].date.to_string(), "2024-03-01");
        assert_eq!(series[1].date.to_string(), "2024-03-05");
    }

    #[test]
    fn test_group_by_date_uses_timezone() {
        let calls = vec![
            CallBuilder::new("1").date(at(3, 23)).build(),
            CallBuilder::new("2").date(at(4, 1)).build(),
        ];

        assert_eq!(group_by_date(&calls, &TimezoneConfig::utc()).len(), 2);

        // Both instants are still March 3rd in New York
        let new_york = TimezoneConfig::new(chrono_tz::America::New_York);
        let series = group_by_date(&calls, &new_york);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date.to_string(), "2024-03-03");
        assert_eq!(series[0].total, 2);
    }

    #[test]
    fn test_outcome_distribution_partitions_input() {
        let calls = vec![
            CallBuilder::new("1").outcome("qualified").build(),
            CallBuilder::new("2").outcome("closed-won").build(),
            CallBuilder::new("3").outcome("lost").build(),
            CallBuilder::new("4").outcome("follow-up").build(),
            CallBuilder::new("5").outcome("closed-lost").build(),
            CallBuilder::new("6").outcome("voicemail").build(),
        ];

        let dist = group_by_outcome(&calls);
        assert_eq!(dist.qualified, 2);
        assert_eq!(dist.lost, 1);
        assert_eq!(dist.other, 3);
        assert_eq!(dist.total(), calls.len());

        let entries: Vec<_> = dist.entries().collect();
        assert_eq!(
            entries,
            [
                (OutcomeGroup::Qualified, 2),
                (OutcomeGroup::Lost, 1),
                (OutcomeGroup::Other, 3)
            ]
        );
    }

    #[test]
    fn test_sentiment_by_outcome() {
        let calls = vec![
            CallBuilder::new("1").outcome("qualified").sentiment(0.8).build(),
            CallBuilder::new("2").outcome("qualified").sentiment(0.6).build(),
            CallBuilder::new("3").outcome("lost").sentiment(0.2).build(),
            CallBuilder::new("4").outcome("mystery").sentiment(0.5).build(),
        ];

        let result = avg_sentiment_by_outcome(&calls);
        let order: Vec<_> = result.buckets.iter().map(|b| b.bucket).collect();
        assert_eq!(order, OutcomeBucket::ALL);

        assert!((result.average(OutcomeBucket::Qualified) - 0.7).abs() < 1e-9);
        assert_eq!(result.average(OutcomeBucket::ClosedWon), 0.0);
        assert_eq!(result.get(OutcomeBucket::ClosedWon).unwrap().calls, 0);
        assert!((result.average(OutcomeBucket::Lost) - 0.2).abs() < 1e-9);
        assert!((result.average(OutcomeBucket::Other) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(group_by_date(&[], &TimezoneConfig::utc()).is_empty());
        assert_eq!(group_by_outcome(&[]), OutcomeDistribution::default());

        let sentiment = avg_sentiment_by_outcome(&[]);
        assert_eq!(sentiment.buckets.len(), 4);
        assert!(sentiment.buckets.iter().all(|b| b.avg_sentiment == 0.0 && b.calls == 0));
    }
}
