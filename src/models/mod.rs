//! Data models for the Skycast dashboard
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and geocoding results
//! - Weather: Current weather snapshot and measurements
//! - Forecast: Forecast sample series and utilities

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{ForecastSample, ForecastSeries};
pub use location::{Coordinates, GeocodingResult};
pub use weather::{WeatherCondition, WeatherSnapshot};
