//! Location model for geographic coordinates and geocoding results

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair identifying a location
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create a new coordinate pair
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether this pair can identify a location (both components finite)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Round coordinates to micro-degrees for cache key generation
    #[must_use]
    pub fn micro_degrees(&self) -> (i64, i64) {
        let lat_micro = (self.latitude * 1_000_000.0).round();
        let lng_micro = (self.longitude * 1_000_000.0).round();
        (lat_micro as i64, lng_micro as i64)
    }

    /// Generate the cache key shared by all remote lookups for this location
    #[must_use]
    pub fn cache_key(&self) -> String {
        let (lat, lng) = self.micro_degrees();
        format!("{lat}:{lng}")
    }

    /// Format coordinates for display
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One candidate returned by forward or reverse geocoding
///
/// Used only for display labeling, never as a cache key.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeocodingResult {
    /// Location name (city, town, ...)
    pub name: String,
    /// State or region, when the service reports one
    pub state: Option<String>,
    /// Country code (ISO 3166-1 alpha-2)
    pub country: String,
    /// Coordinates of the candidate
    pub coordinates: Coordinates,
}

impl GeocodingResult {
    /// Label shown for this candidate, e.g. "Berlin, DE" or "Portland, Oregon, US"
    #[must_use]
    pub fn display_label(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}
