//! Weather API client for OpenWeatherMap integration
//!
//! This module provides HTTP client functionality for retrieving current
//! weather, forecast, and geocoding data from the OpenWeatherMap API.
//! Every operation issues exactly one attempt; recovery is left to the
//! caller's explicit retry controls.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::config::SkycastConfig;
use crate::error::{FetchError, FetchOperation};
use crate::models::{Coordinates, ForecastSeries, GeocodingResult, WeatherSnapshot};

/// HTTP client for the OpenWeatherMap weather and geocoding endpoints
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    geo_url: String,
    units: String,
    lang: String,
    geocode_limit: u8,
}

impl WeatherApiClient {
    /// Create a new weather API client
    pub fn new(config: &SkycastConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.weather.timeout_seconds.into());

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_key: config.weather.api_key.clone(),
            base_url: config.weather.base_url.trim_end_matches('/').to_string(),
            geo_url: config.weather.geo_url.trim_end_matches('/').to_string(),
            units: config.weather.units.clone(),
            lang: config.weather.lang.clone(),
            geocode_limit: config.weather.geocode_limit,
        })
    }

    /// Get the current weather for a coordinate pair
    #[instrument(skip(self), fields(lat = coords.latitude, lon = coords.longitude))]
    pub async fn current_weather(&self, coords: Coordinates) -> Result<WeatherSnapshot, FetchError> {
        let operation = FetchOperation::CurrentWeather;
        let key = self.api_key(operation)?;
        let url = format!(
            "{}/weather?lat={}&lon={}&units={}&lang={}&appid={}",
            self.base_url, coords.latitude, coords.longitude, self.units, self.lang, key
        );

        let response: openweather::CurrentResponse = self.get_json(operation, &url).await?;
        let snapshot = WeatherSnapshot::from(response);
        info!(
            "current weather for {}: {:.1}°C, {}",
            coords.format(),
            snapshot.temperature,
            snapshot.condition.description
        );
        Ok(snapshot)
    }

    /// Get the 5-day/3-hour forecast series for a coordinate pair
    #[instrument(skip(self), fields(lat = coords.latitude, lon = coords.longitude))]
    pub async fn forecast(&self, coords: Coordinates) -> Result<ForecastSeries, FetchError> {
        let operation = FetchOperation::Forecast;
        let key = self.api_key(operation)?;
        let url = format!(
            "{}/forecast?lat={}&lon={}&units={}&lang={}&appid={}",
            self.base_url, coords.latitude, coords.longitude, self.units, self.lang, key
        );

        let response: openweather::ForecastResponse = self.get_json(operation, &url).await?;
        let series = ForecastSeries::from(response);
        info!(
            "forecast for {}: {} samples",
            coords.format(),
            series.samples.len()
        );
        Ok(series)
    }

    /// Reverse-geocode a coordinate pair into named location candidates
    #[instrument(skip(self), fields(lat = coords.latitude, lon = coords.longitude))]
    pub async fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> Result<Vec<GeocodingResult>, FetchError> {
        let operation = FetchOperation::Geocode;
        let key = self.api_key(operation)?;
        let url = format!(
            "{}/reverse?lat={}&lon={}&limit={}&appid={}",
            self.geo_url, coords.latitude, coords.longitude, self.geocode_limit, key
        );

        let entries: Vec<openweather::GeoEntry> = self.get_json(operation, &url).await?;
        if entries.is_empty() {
            warn!("no reverse geocoding results for {}", coords.format());
        }
        Ok(entries.into_iter().map(GeocodingResult::from).collect())
    }

    /// Geocode a city name into location candidates
    #[instrument(skip(self), fields(city = name))]
    pub async fn search_city(&self, name: &str) -> Result<Vec<GeocodingResult>, FetchError> {
        let operation = FetchOperation::Geocode;
        let key = self.api_key(operation)?;
        let url = format!(
            "{}/direct?q={}&limit={}&appid={}",
            self.geo_url,
            urlencoding::encode(name),
            self.geocode_limit,
            key
        );

        let entries: Vec<openweather::GeoEntry> = self.get_json(operation, &url).await?;
        if entries.is_empty() {
            warn!("no geocoding results for '{}'", name);
        }
        Ok(entries.into_iter().map(GeocodingResult::from).collect())
    }

    fn api_key(&self, operation: FetchOperation) -> Result<&str, FetchError> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(FetchError::new(
                operation,
                "missing OpenWeather API key (set SKYCAST_WEATHER__API_KEY)",
            )),
        }
    }

    /// Issue one GET request and decode the JSON body. No retries.
    #[instrument(skip(self, url), fields(url = %url.split("appid=").next().unwrap_or(url)))]
    async fn get_json<D: DeserializeOwned>(
        &self,
        operation: FetchOperation,
        url: &str,
    ) -> Result<D, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| FetchError::new(operation, format!("network error: {error}")))?;

        let status = response.status();
        debug!("HTTP response received: {}", status);
        if !status.is_success() {
            return Err(FetchError::new(
                operation,
                format!(
                    "HTTP {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            ));
        }

        response
            .json()
            .await
            .map_err(|error| FetchError::new(operation, format!("invalid response body: {error}")))
    }
}

/// `OpenWeatherMap` API response structures and conversion utilities
mod openweather {
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    use crate::models::{
        Coordinates, ForecastSample, ForecastSeries, GeocodingResult, WeatherCondition,
        WeatherSnapshot,
    };

    /// Current conditions response from the `/weather` endpoint
    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub weather: Vec<ConditionData>,
        pub main: MainData,
        pub wind: WindData,
        pub dt: i64,
        pub sys: SysData,
        #[serde(default)]
        pub timezone: i32,
    }

    /// Forecast response from the `/forecast` endpoint
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub list: Vec<ForecastEntry>,
        pub city: CityData,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastEntry {
        pub dt: i64,
        pub main: MainData,
        pub weather: Vec<ConditionData>,
        pub wind: WindData,
    }

    #[derive(Debug, Deserialize)]
    pub struct CityData {
        pub country: Option<String>,
        #[serde(default)]
        pub timezone: i32,
    }

    #[derive(Debug, Deserialize)]
    pub struct ConditionData {
        pub id: u32,
        pub main: String,
        pub description: String,
        pub icon: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainData {
        pub temp: f64,
        #[serde(default)]
        pub feels_like: f64,
        pub temp_min: f64,
        pub temp_max: f64,
        #[serde(default)]
        pub pressure: u32,
        pub humidity: u8,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindData {
        pub speed: f64,
        #[serde(default)]
        pub deg: u16,
    }

    #[derive(Debug, Deserialize)]
    pub struct SysData {
        pub country: Option<String>,
        pub sunrise: i64,
        pub sunset: i64,
    }

    /// Geocoding entry from the `/geo/1.0` endpoints
    #[derive(Debug, Deserialize)]
    pub struct GeoEntry {
        pub name: String,
        pub lat: f64,
        pub lon: f64,
        #[serde(default)]
        pub country: String,
        pub state: Option<String>,
    }

    fn unix_to_utc(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now)
    }

    fn condition(mut conditions: Vec<ConditionData>) -> WeatherCondition {
        if conditions.is_empty() {
            WeatherCondition {
                id: 0,
                main: "Unknown".to_string(),
                description: "Unknown".to_string(),
                icon: String::new(),
            }
        } else {
            conditions.remove(0).into()
        }
    }

    impl From<ConditionData> for WeatherCondition {
        fn from(data: ConditionData) -> Self {
            Self {
                id: data.id,
                main: data.main,
                description: data.description,
                icon: data.icon,
            }
        }
    }

    impl From<CurrentResponse> for WeatherSnapshot {
        fn from(response: CurrentResponse) -> Self {
            Self {
                timestamp: unix_to_utc(response.dt),
                temperature: response.main.temp,
                feels_like: response.main.feels_like,
                temp_min: response.main.temp_min,
                temp_max: response.main.temp_max,
                humidity: response.main.humidity,
                pressure: response.main.pressure,
                wind_speed: response.wind.speed,
                wind_direction: response.wind.deg,
                sunrise: unix_to_utc(response.sys.sunrise),
                sunset: unix_to_utc(response.sys.sunset),
                utc_offset_seconds: response.timezone,
                condition: condition(response.weather),
                country: response.sys.country,
            }
        }
    }

    impl From<ForecastEntry> for ForecastSample {
        fn from(entry: ForecastEntry) -> Self {
            Self {
                timestamp: unix_to_utc(entry.dt),
                temp: entry.main.temp,
                temp_min: entry.main.temp_min,
                temp_max: entry.main.temp_max,
                humidity: entry.main.humidity,
                wind_speed: entry.wind.speed,
                condition: condition(entry.weather),
            }
        }
    }

    impl From<ForecastResponse> for ForecastSeries {
        fn from(response: ForecastResponse) -> Self {
            Self {
                samples: response.list.into_iter().map(ForecastSample::from).collect(),
                utc_offset_seconds: response.city.timezone,
                country: response.city.country,
            }
        }
    }

    impl From<GeoEntry> for GeocodingResult {
        fn from(entry: GeoEntry) -> Self {
            Self {
                name: entry.name,
                state: entry.state,
                country: entry.country,
                coordinates: Coordinates::new(entry.lat, entry.lon),
            }
        }
    }
}
