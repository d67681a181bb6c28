//! Current weather snapshot model and display methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weather condition as reported by the remote service
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WeatherCondition {
    /// Condition code from the API
    pub id: u32,
    /// Condition group (e.g. "Clouds", "Rain")
    pub main: String,
    /// Human-readable description of the condition
    pub description: String,
    /// Icon identifier from the API
    pub icon: String,
}

impl WeatherCondition {
    /// URL of the large condition icon hosted by OpenWeather
    #[must_use]
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@4x.png", self.icon)
    }
}

/// Point-in-time weather reading for one location
///
/// Immutable once fetched; a refetch replaces the whole snapshot.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherSnapshot {
    /// Observation timestamp
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    /// Minimum observed temperature in Celsius
    pub temp_min: f64,
    /// Maximum observed temperature in Celsius
    pub temp_max: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Atmospheric pressure in hPa
    pub pressure: u32,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: u16,
    /// Sunrise time at the location
    pub sunrise: DateTime<Utc>,
    /// Sunset time at the location
    pub sunset: DateTime<Utc>,
    /// Offset of the location's local time from UTC, in seconds
    pub utc_offset_seconds: i32,
    /// Weather condition
    pub condition: WeatherCondition,
    /// Country code (ISO 3166-1 alpha-2), when the service reports one
    pub country: Option<String>,
}

impl WeatherSnapshot {
    /// Convert wind direction from degrees to an 8-wind cardinal direction
    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
        let index = ((f64::from(degrees % 360) / 45.0).round() as usize) % DIRECTIONS.len();
        DIRECTIONS[index]
    }

    /// Format a temperature rounded to whole degrees
    #[must_use]
    pub fn format_temperature(value: f64) -> String {
        format!("{}°", value.round() as i64)
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        let direction = Self::wind_direction_to_cardinal(self.wind_direction);
        format!("{:.1} m/s {}", self.wind_speed, direction)
    }
}
