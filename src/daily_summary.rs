//! Per-calendar-day aggregation of forecast samples
//!
//! Folds the 3-hourly forecast series into one summary per local calendar
//! day. Min/max temperatures widen as samples arrive; humidity, wind, and the
//! representative condition take the last sample seen for the day
//! (last-write-wins, deliberately not an average).

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ForecastSample, ForecastSeries, WeatherCondition};

/// Number of day-ahead buckets shown by the dashboard
pub const FORECAST_DAYS: usize = 5;

/// Aggregated forecast for one local calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecastSummary {
    /// Local calendar date of the bucket
    pub date: NaiveDate,
    /// Lowest minimum temperature across the day's samples
    pub temp_min: f64,
    /// Highest maximum temperature across the day's samples
    pub temp_max: f64,
    /// Humidity of the last sample seen for the day
    pub humidity: u8,
    /// Wind speed of the last sample seen for the day
    pub wind_speed: f64,
    /// Condition of the last sample seen for the day
    pub condition: WeatherCondition,
    /// Timestamp of the sample that seeded the bucket
    pub timestamp: DateTime<Utc>,
}

/// Bucket forecast samples by their local calendar date.
///
/// Samples are folded in input order; buckets keep the first-seen order of
/// their dates. An empty input yields an empty result.
#[must_use]
pub fn bucket_by_day(samples: &[ForecastSample], offset: FixedOffset) -> Vec<DailyForecastSummary> {
    let mut buckets: Vec<DailyForecastSummary> = Vec::new();

    for sample in samples {
        let date = sample.timestamp.with_timezone(&offset).date_naive();
        match buckets.iter_mut().find(|bucket| bucket.date == date) {
            Some(bucket) => {
                bucket.temp_min = bucket.temp_min.min(sample.temp_min);
                bucket.temp_max = bucket.temp_max.max(sample.temp_max);
                bucket.humidity = sample.humidity;
                bucket.wind_speed = sample.wind_speed;
                bucket.condition = sample.condition.clone();
            }
            None => buckets.push(DailyForecastSummary {
                date,
                temp_min: sample.temp_min,
                temp_max: sample.temp_max,
                humidity: sample.humidity,
                wind_speed: sample.wind_speed,
                condition: sample.condition.clone(),
                timestamp: sample.timestamp,
            }),
        }
    }

    buckets
}

/// The day-ahead window: skip the first bucket ("today") and take up to
/// `count` following days. Empty when fewer than two distinct dates exist.
#[must_use]
pub fn next_days(buckets: &[DailyForecastSummary], count: usize) -> &[DailyForecastSummary] {
    if buckets.len() <= 1 {
        return &[];
    }
    let end = buckets.len().min(1 + count);
    &buckets[1..end]
}

impl ForecastSeries {
    /// Bucket this series by its location's local calendar days
    #[must_use]
    pub fn daily_summaries(&self) -> Vec<DailyForecastSummary> {
        bucket_by_day(&self.samples, self.utc_offset())
    }
}
