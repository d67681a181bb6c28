//! Skycast - location-aware weather dashboard core
//!
//! This library provides the data-fetch orchestration behind a weather
//! dashboard: geolocation acquisition, coordinate-keyed query caching, and
//! per-day aggregation of forecast samples.

pub mod api;
pub mod cache;
pub mod config;
pub mod daily_summary;
pub mod dashboard;
pub mod error;
pub mod geolocation;
pub mod models;
pub mod queries;
pub mod theme;

// Re-export core types for public API
pub use api::WeatherApiClient;
pub use cache::{QueryCache, QueryStatus};
pub use config::SkycastConfig;
pub use daily_summary::{DailyForecastSummary, FORECAST_DAYS, bucket_by_day, next_days};
pub use dashboard::{DashboardSnapshot, DashboardView, WeatherDashboard};
pub use error::{FetchError, FetchOperation, LocationError, SkycastError};
pub use geolocation::{
    GeolocationProvider, GeolocationState, PositionOptions, PositionSource, StaticPositionSource,
};
pub use models::{
    Coordinates, ForecastSample, ForecastSeries, GeocodingResult, WeatherCondition,
    WeatherSnapshot,
};
pub use queries::WeatherQueries;
pub use theme::{KeyValueStore, MemoryStore, Theme, ThemeContext};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkycastError>;
