//! Forecast time-series model

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::WeatherCondition;

/// One entry in the forecast time series (3-hour steps from the API)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForecastSample {
    /// Timestamp for this forecast entry
    pub timestamp: DateTime<Utc>,
    /// Forecast temperature in Celsius
    pub temp: f64,
    /// Minimum temperature in Celsius for this step
    pub temp_min: f64,
    /// Maximum temperature in Celsius for this step
    pub temp_max: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Weather condition for this step
    pub condition: WeatherCondition,
}

/// Forecast sample sequence for one location
///
/// Samples arrive in chronological order from the API and are kept that way.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForecastSeries {
    /// Chronological forecast entries
    pub samples: Vec<ForecastSample>,
    /// Offset of the location's local time from UTC, in seconds
    pub utc_offset_seconds: i32,
    /// Country code of the forecast city, when the service reports one
    pub country: Option<String>,
}

impl ForecastSeries {
    /// Create a new series
    #[must_use]
    pub fn new(samples: Vec<ForecastSample>, utc_offset_seconds: i32) -> Self {
        Self {
            samples,
            utc_offset_seconds,
            country: None,
        }
    }

    /// The location's local-time offset as a chrono `FixedOffset`
    ///
    /// Falls back to UTC when the reported offset is out of range.
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }
}
