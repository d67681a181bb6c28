//! Configuration management for the Skycast dashboard
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SkycastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the Skycast dashboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SkycastConfig {
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Query cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Geolocation configuration
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather API key; its absence surfaces as failed fetches at first use
    pub api_key: Option<String>,
    /// Base URL for the weather endpoints
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Base URL for the geocoding endpoints
    #[serde(default = "default_geo_url")]
    pub geo_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Unit system requested from the API
    #[serde(default = "default_units")]
    pub units: String,
    /// Language requested from the API
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Maximum number of geocoding candidates to request
    #[serde(default = "default_geocode_limit")]
    pub geocode_limit: u8,
}

/// Query cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds until a cached entry counts as stale
    #[serde(default = "default_stale_seconds")]
    pub stale_seconds: u64,
    /// Seconds of disuse until a cached entry is evicted
    #[serde(default = "default_retention_seconds")]
    pub retention_seconds: u64,
}

/// Geolocation configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Fixed latitude reported by the host environment, when set
    pub latitude: Option<f64>,
    /// Fixed longitude reported by the host environment, when set
    pub longitude: Option<f64>,
    /// Bounded wait for a position request, in seconds
    #[serde(default = "default_geolocation_timeout")]
    pub timeout_seconds: u32,
    /// Request the most accurate position available
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,
    /// Maximum acceptable age of a cached platform position, in seconds
    #[serde(default)]
    pub maximum_age_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geo_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_geocode_limit() -> u8 {
    5
}

fn default_stale_seconds() -> u64 {
    300
}

fn default_retention_seconds() -> u64 {
    300
}

fn default_geolocation_timeout() -> u32 {
    5
}

fn default_high_accuracy() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            geo_url: default_geo_url(),
            timeout_seconds: default_weather_timeout(),
            units: default_units(),
            lang: default_lang(),
            geocode_limit: default_geocode_limit(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_seconds: default_stale_seconds(),
            retention_seconds: default_retention_seconds(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            timeout_seconds: default_geolocation_timeout(),
            high_accuracy: default_high_accuracy(),
            maximum_age_seconds: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SkycastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with SKYCAST_ prefix,
        // e.g. SKYCAST_WEATHER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("SKYCAST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: SkycastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skycast").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the API key, when one is provided
    pub fn validate_api_key(&self) -> Result<()> {
        // A missing key is tolerated here; it surfaces as failed fetches at
        // first use rather than a startup abort.
        if let Some(api_key) = &self.weather.api_key {
            if api_key.is_empty() {
                return Err(SkycastError::config(
                    "Weather API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() > 100 {
                return Err(SkycastError::config(
                    "Weather API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds == 0 || self.weather.timeout_seconds > 300 {
            return Err(SkycastError::config(
                "Weather API timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.cache.stale_seconds > 86_400 {
            return Err(
                SkycastError::config("Cache staleness window cannot exceed 24 hours").into(),
            );
        }

        if self.cache.retention_seconds > 86_400 {
            return Err(
                SkycastError::config("Cache retention window cannot exceed 24 hours").into(),
            );
        }

        if self.geolocation.timeout_seconds == 0 || self.geolocation.timeout_seconds > 60 {
            return Err(SkycastError::config(
                "Geolocation timeout must be between 1 and 60 seconds",
            )
            .into());
        }

        if self.weather.geocode_limit == 0 {
            return Err(SkycastError::config("Geocode limit must be at least 1").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SkycastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for url in [&self.weather.base_url, &self.weather.geo_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SkycastError::config(
                    "Weather API URLs must be valid HTTP or HTTPS URLs",
                )
                .into());
            }
        }

        Ok(())
    }
}
