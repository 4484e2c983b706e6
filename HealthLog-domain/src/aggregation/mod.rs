//! Time-series aggregation of health readings
//!
//! Readings are partitioned into buckets by calendar day or by Sunday-first
//! week, and every declared [`Channel`] is averaged per bucket. A channel with
//! no values in a bucket reports `null`, never zero. Calendar fields are taken
//! in UTC.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Errors raised by the aggregation engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("Invalid grouping mode '{0}', expected 'day' or 'week'")]
    InvalidGroupMode(String),
}

/// How readings are bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// One bucket per calendar day
    #[default]
    Day,
    /// One bucket per week, keyed by the Sunday that starts it
    Week,
}

impl GroupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupMode::Day => "day",
            GroupMode::Week => "week",
        }
    }
}

impl fmt::Display for GroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupMode {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(GroupMode::Day),
            "week" => Ok(GroupMode::Week),
            other => Err(AggregationError::InvalidGroupMode(other.to_string())),
        }
    }
}

/// Bucket key of a timestamp: its UTC date, or the Sunday on or before it
pub fn group_key(at: DateTime<Utc>, mode: GroupMode) -> NaiveDate {
    let date = at.date_naive();
    match mode {
        GroupMode::Day => date,
        GroupMode::Week => {
            let back = u64::from(date.weekday().num_days_from_sunday());
            date.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
        }
    }
}

/// A reading with an event time
pub trait Timestamped {
    fn recorded_at(&self) -> DateTime<Utc>;
}

/// How a channel's statistics are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Rounded to the nearest whole number
    Integer,
    /// Full precision
    Exact,
}

impl Rounding {
    fn apply(self, value: f64) -> StatValue {
        match self {
            Rounding::Integer => StatValue::Integer(value.round() as i64),
            Rounding::Exact => StatValue::Decimal(value),
        }
    }
}

/// A numeric statistic as serialised
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Decimal(f64),
}

impl StatValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            StatValue::Integer(v) => v as f64,
            StatValue::Decimal(v) => v,
        }
    }
}

type Selector<R> = Box<dyn Fn(&R) -> Option<f64> + Send + Sync>;

/// A named value extracted from each reading
pub struct Channel<R> {
    name: String,
    rounding: Rounding,
    selector: Selector<R>,
}

impl<R> Channel<R> {
    pub fn new(
        name: impl Into<String>,
        rounding: Rounding,
        selector: impl Fn(&R) -> Option<f64> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            rounding,
            selector: Box::new(selector),
        }
    }

    /// Channel presented as whole numbers
    pub fn integer(
        name: impl Into<String>,
        selector: impl Fn(&R) -> Option<f64> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, Rounding::Integer, selector)
    }

    /// Channel presented at full precision
    pub fn exact(
        name: impl Into<String>,
        selector: impl Fn(&R) -> Option<f64> + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, Rounding::Exact, selector)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Present and finite value of this channel; non-finite values are skipped
    fn select(&self, reading: &R) -> Option<f64> {
        let value = (self.selector)(reading)?;
        if value.is_finite() {
            Some(value)
        } else {
            debug!("Skipping non-finite value {} in channel {}", value, self.name);
            None
        }
    }

    /// Values of this channel in canonical order
    fn values<'a>(&self, readings: impl Iterator<Item = &'a R>) -> Vec<f64>
    where
        R: 'a,
    {
        let mut values: Vec<f64> = readings.filter_map(|r| self.select(r)).collect();
        values.sort_by(f64::total_cmp);
        values
    }
}

impl<R> fmt::Debug for Channel<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("rounding", &self.rounding)
            .finish()
    }
}

fn mean(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        None
    } else {
        Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
    }
}

/// One bucket of the grouped output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    /// Group key
    pub date: NaiveDate,

    /// Earliest timestamp in the bucket
    pub recorded_at: DateTime<Utc>,

    /// Number of readings in the bucket
    pub count: usize,

    /// Per-channel averages, `null` when the channel had no values
    #[serde(flatten)]
    pub channels: IndexMap<String, Option<StatValue>>,
}

impl BucketSummary {
    /// Average of a channel; `None` when the channel is unknown or empty
    pub fn value(&self, channel: &str) -> Option<StatValue> {
        self.channels.get(channel).copied().flatten()
    }
}

struct Bucket<'a, R> {
    recorded_at: DateTime<Utc>,
    members: Vec<&'a R>,
}

/// Group readings into buckets ordered by ascending key
pub fn aggregate<R: Timestamped>(
    readings: &[R],
    mode: GroupMode,
    channels: &[Channel<R>],
) -> Vec<BucketSummary> {
    let mut ordered: Vec<&R> = readings.iter().collect();
    ordered.sort_by_key(|r| r.recorded_at());

    let mut buckets: BTreeMap<NaiveDate, Bucket<'_, R>> = BTreeMap::new();
    for reading in ordered {
        let at = reading.recorded_at();
        buckets
            .entry(group_key(at, mode))
            .or_insert_with(|| Bucket {
                recorded_at: at,
                members: Vec::new(),
            })
            .members
            .push(reading);
    }

    buckets
        .into_iter()
        .map(|(date, bucket)| {
            let channels = channels
                .iter()
                .map(|channel| {
                    let values = channel.values(bucket.members.iter().copied());
                    let average = mean(&values).map(|m| channel.rounding.apply(m));
                    (channel.name.clone(), average)
                })
                .collect();

            BucketSummary {
                date,
                recorded_at: bucket.recorded_at,
                count: bucket.members.len(),
                channels,
            }
        })
        .collect()
}

/// Statistics of one channel over a whole period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStats {
    /// Number of present values
    pub count: usize,
    pub average: Option<StatValue>,
    pub min: Option<StatValue>,
    pub max: Option<StatValue>,
}

/// Ungrouped statistics of a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// Number of readings in the period
    pub count: usize,

    #[serde(flatten)]
    pub channels: IndexMap<String, ChannelStats>,
}

impl PeriodSummary {
    pub fn channel(&self, name: &str) -> Option<&ChannelStats> {
        self.channels.get(name)
    }
}

/// Count, average, min and max of every channel across all readings
pub fn summarize<R>(readings: &[R], channels: &[Channel<R>]) -> PeriodSummary {
    let channels = channels
        .iter()
        .map(|channel| {
            let values = channel.values(readings.iter());
            let stats = ChannelStats {
                count: values.len(),
                average: mean(&values).map(|m| channel.rounding.apply(m)),
                min: values.first().map(|v| channel.rounding.apply(*v)),
                max: values.last().map(|v| channel.rounding.apply(*v)),
            };
            (channel.name.clone(), stats)
        })
        .collect();

    PeriodSummary {
        count: readings.len(),
        channels,
    }
}

/// Share of taken doses as a whole percentage; 0 when nothing was logged
pub fn compliance_percentage(taken: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (taken as f64 / total as f64 * 100.0).round() as u32
}

/// Compliance of one bucket of dose logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceBucket {
    pub date: NaiveDate,
    pub taken: usize,
    pub total: usize,
    pub compliance: u32,
}

/// Group dose logs into buckets and report the compliance of each
pub fn aggregate_compliance<R: Timestamped>(
    logs: &[R],
    mode: GroupMode,
    taken: impl Fn(&R) -> bool,
) -> Vec<ComplianceBucket> {
    let mut counts: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for log in logs {
        let entry = counts.entry(group_key(log.recorded_at(), mode)).or_default();
        if taken(log) {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    counts
        .into_iter()
        .map(|(date, (taken, total))| ComplianceBucket {
            date,
            taken,
            total,
            compliance: compliance_percentage(taken, total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone)]
    struct Sample {
        at: DateTime<Utc>,
        systolic: f64,
        diastolic: f64,
        pulse: Option<f64>,
    }

    impl Timestamped for Sample {
        fn recorded_at(&self) -> DateTime<Utc> {
            self.at
        }
    }

    struct Dose(DateTime<Utc>, bool);

    impl Timestamped for Dose {
        fn recorded_at(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(ts: DateTime<Utc>, systolic: f64, diastolic: f64, pulse: Option<f64>) -> Sample {
        Sample { at: ts, systolic, diastolic, pulse }
    }

    fn bp_channels() -> Vec<Channel<Sample>> {
        vec![
            Channel::integer("systolic", |s: &Sample| Some(s.systolic)),
            Channel::integer("diastolic", |s: &Sample| Some(s.diastolic)),
            Channel::integer("pulse", |s: &Sample| s.pulse),
        ]
    }

    fn spread() -> Vec<Sample> {
        vec![
            sample(at(2024, 3, 6, 9), 140.0, 90.0, None),
            sample(at(2024, 3, 1, 23), 118.0, 76.0, Some(64.0)),
            sample(at(2024, 3, 3, 0), 122.0, 81.0, Some(70.0)),
            sample(at(2024, 3, 1, 8), 121.0, 79.0, Some(68.0)),
            sample(at(2024, 3, 10, 12), 135.0, 88.0, Some(75.0)),
            sample(at(2024, 3, 9, 18), 128.0, 84.0, None),
        ]
    }

    #[test]
    fn test_day_key_discards_time_of_day() {
        assert_eq!(group_key(at(2024, 3, 1, 8), GroupMode::Day), date(2024, 3, 1));
        assert_eq!(group_key(at(2024, 3, 1, 23), GroupMode::Day), date(2024, 3, 1));
    }

    #[test]
    fn test_week_key_is_preceding_sunday() {
        assert_eq!(group_key(at(2024, 3, 6, 12), GroupMode::Week), date(2024, 3, 3));
        assert_eq!(group_key(at(2024, 3, 3, 0), GroupMode::Week), date(2024, 3, 3));
        assert_eq!(group_key(at(2024, 3, 9, 23), GroupMode::Week), date(2024, 3, 3));
        // Week spanning a month boundary
        assert_eq!(group_key(at(2024, 3, 1, 12), GroupMode::Week), date(2024, 2, 25));
    }

    #[test]
    fn test_group_mode_parsing_fails_fast() {
        assert_eq!("day".parse::<GroupMode>(), Ok(GroupMode::Day));
        assert_eq!("week".parse::<GroupMode>(), Ok(GroupMode::Week));
        assert_eq!(
            "month".parse::<GroupMode>(),
            Err(AggregationError::InvalidGroupMode("month".to_string()))
        );
        assert!("".parse::<GroupMode>().is_err());
    }

    #[test]
    fn test_counts_partition_the_input() {
        let readings = spread();
        for mode in [GroupMode::Day, GroupMode::Week] {
            let buckets = aggregate(&readings, mode, &bp_channels());
            let total: usize = buckets.iter().map(|b| b.count).sum();
            assert_eq!(total, readings.len());
        }
    }

    #[test]
    fn test_buckets_are_chronological() {
        let buckets = aggregate(&spread(), GroupMode::Day, &bp_channels());
        let keys: Vec<NaiveDate> = buckets.iter().map(|b| b.date).collect();
        assert_eq!(
            keys,
            vec![date(2024, 3, 1), date(2024, 3, 3), date(2024, 3, 6), date(2024, 3, 9), date(2024, 3, 10)]
        );

        let weekly = aggregate(&spread(), GroupMode::Week, &bp_channels());
        let keys: Vec<NaiveDate> = weekly.iter().map(|b| b.date).collect();
        assert_eq!(keys, vec![date(2024, 2, 25), date(2024, 3, 3), date(2024, 3, 10)]);
        assert_eq!(weekly[1].count, 3);
    }

    #[test]
    fn test_single_day_blood_pressure_bucket() {
        let readings = vec![
            sample(at(2024, 3, 1, 8), 120.0, 80.0, None),
            sample(at(2024, 3, 1, 13), 130.0, 85.0, None),
            sample(at(2024, 3, 1, 21), 125.0, 82.0, None),
        ];

        let buckets = aggregate(&readings, GroupMode::Day, &bp_channels());
        assert_eq!(buckets.len(), 1);

        let bucket = &buckets[0];
        assert_eq!(bucket.date, date(2024, 3, 1));
        assert_eq!(bucket.count, 3);
        assert_eq!(bucket.value("systolic"), Some(StatValue::Integer(125)));
        assert_eq!(bucket.value("diastolic"), Some(StatValue::Integer(82)));
        assert_eq!(bucket.recorded_at, at(2024, 3, 1, 8));
    }

    #[test]
    fn test_empty_channel_is_null_not_zero() {
        let readings = vec![sample(at(2024, 3, 6, 9), 140.0, 90.0, None)];
        let buckets = aggregate(&readings, GroupMode::Day, &bp_channels());

        assert!(buckets[0].channels.contains_key("pulse"));
        assert_eq!(buckets[0].channels["pulse"], None);

        let json = serde_json::to_value(&buckets[0]).unwrap();
        assert!(json["pulse"].is_null());
        assert_eq!(json["systolic"], 140);
        assert_eq!(json["date"], "2024-03-06");
    }

    #[test]
    fn test_integer_channels_round_to_nearest() {
        let readings = vec![
            sample(at(2024, 3, 1, 7), 100.0, 0.0, None),
            sample(at(2024, 3, 1, 12), 101.0, 0.0, None),
            sample(at(2024, 3, 1, 19), 103.0, 0.0, None),
        ];
        let glucose = vec![Channel::integer("glucose", |s: &Sample| Some(s.systolic))];

        let buckets = aggregate(&readings, GroupMode::Day, &glucose);
        assert_eq!(buckets[0].value("glucose"), Some(StatValue::Integer(101)));
    }

    #[test]
    fn test_exact_channels_keep_precision() {
        let readings = vec![
            sample(at(2024, 3, 1, 7), 80.2, 0.0, None),
            sample(at(2024, 3, 1, 19), 80.5, 0.0, None),
        ];
        let weight = vec![Channel::exact("weight", |s: &Sample| Some(s.systolic))];

        let buckets = aggregate(&readings, GroupMode::Day, &weight);
        let value = buckets[0].value("weight").map(|v| v.as_f64()).unwrap();
        assert!((value - 80.35).abs() < 1e-9);
        assert!(matches!(buckets[0].value("weight"), Some(StatValue::Decimal(_))));
    }

    #[test]
    fn test_single_reading_bucket() {
        let readings = vec![sample(at(2024, 3, 1, 7), 118.6, 77.4, Some(61.5))];
        let buckets = aggregate(&readings, GroupMode::Week, &bp_channels());

        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets[0].value("systolic"), Some(StatValue::Integer(119)));
        assert_eq!(buckets[0].value("diastolic"), Some(StatValue::Integer(77)));
        assert_eq!(buckets[0].value("pulse"), Some(StatValue::Integer(62)));
    }

    #[test]
    fn test_permuted_input_gives_identical_output() {
        let readings = spread();
        let expected = aggregate(&readings, GroupMode::Week, &bp_channels());

        let mut reversed = readings.clone();
        reversed.reverse();
        assert_eq!(aggregate(&reversed, GroupMode::Week, &bp_channels()), expected);

        for shift in 1..readings.len() {
            let mut rotated = readings.clone();
            rotated.rotate_left(shift);
            assert_eq!(aggregate(&rotated, GroupMode::Week, &bp_channels()), expected);
        }
    }

    #[test]
    fn test_empty_input() {
        let readings: Vec<Sample> = Vec::new();
        assert!(aggregate(&readings, GroupMode::Day, &bp_channels()).is_empty());

        let summary = summarize(&readings, &bp_channels());
        assert_eq!(summary.count, 0);
        let systolic = summary.channel("systolic").unwrap();
        assert_eq!(systolic.count, 0);
        assert_eq!(systolic.average, None);
        assert_eq!(systolic.min, None);
        assert_eq!(systolic.max, None);
    }

    #[test]
    fn test_summarize_over_whole_period() {
        let summary = summarize(&spread(), &bp_channels());
        assert_eq!(summary.count, 6);

        let systolic = summary.channel("systolic").unwrap();
        assert_eq!(systolic.count, 6);
        // (140 + 118 + 122 + 121 + 135 + 128) / 6 = 127.33
        assert_eq!(systolic.average, Some(StatValue::Integer(127)));
        assert_eq!(systolic.min, Some(StatValue::Integer(118)));
        assert_eq!(systolic.max, Some(StatValue::Integer(140)));

        let pulse = summary.channel("pulse").unwrap();
        assert_eq!(pulse.count, 4);
        // (64 + 70 + 68 + 75) / 4 = 69.25
        assert_eq!(pulse.average, Some(StatValue::Integer(69)));
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let readings = vec![
            sample(at(2024, 3, 1, 7), f64::NAN, 80.0, Some(f64::INFINITY)),
            sample(at(2024, 3, 1, 9), 120.0, 80.0, None),
        ];
        let buckets = aggregate(&readings, GroupMode::Day, &bp_channels());

        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[0].value("systolic"), Some(StatValue::Integer(120)));
        assert_eq!(buckets[0].value("pulse"), None);
    }

    #[test]
    fn test_compliance_without_logs_is_zero() {
        assert_eq!(compliance_percentage(0, 0), 0);
        assert_eq!(compliance_percentage(2, 3), 67);
        assert_eq!(compliance_percentage(3, 3), 100);
    }

    #[test]
    fn test_weekly_compliance_buckets() {
        let doses = vec![
            Dose(at(2024, 3, 4, 8), true),
            Dose(at(2024, 3, 5, 8), false),
            Dose(at(2024, 3, 6, 8), true),
            Dose(at(2024, 3, 11, 8), false),
        ];

        let buckets = aggregate_compliance(&doses, GroupMode::Week, |d| d.1);
        assert_eq!(
            buckets,
            vec![
                ComplianceBucket { date: date(2024, 3, 3), taken: 2, total: 3, compliance: 67 },
                ComplianceBucket { date: date(2024, 3, 10), taken: 0, total: 1, compliance: 0 },
            ]
        );
    }
}
