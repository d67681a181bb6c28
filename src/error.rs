//! Error types and handling for the Skycast dashboard

use thiserror::Error;

/// Geolocation failure classified from the platform location capability
///
/// Each variant carries the fixed message shown to the user. Always recovered
/// locally by presenting a retry affordance, never fatal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    /// The user rejected the location permission prompt
    #[error(
        "User denied the request for Geolocation. Please enable location services in your browser settings."
    )]
    PermissionDenied,

    /// The platform could not determine a position
    #[error("Location information is unavailable.")]
    PositionUnavailable,

    /// The position request did not complete within the bounded wait
    #[error("The request to get user location timed out.")]
    Timeout,

    /// The platform has no location capability at all
    #[error("Geolocation is not supported")]
    Unsupported,

    /// Anything the platform did not classify
    #[error("An unknown error occurred.")]
    Unknown,
}

/// Remote operations that can fail independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOperation {
    /// Current weather lookup
    CurrentWeather,
    /// Forecast lookup
    Forecast,
    /// Forward or reverse geocoding lookup
    Geocode,
}

/// Failure of one remote fetch operation
///
/// Distinguishable only at operation granularity; the dashboard collapses all
/// of them into one generic user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Current weather request failed
    #[error("current weather request failed: {message}")]
    CurrentWeather { message: String },

    /// Forecast request failed
    #[error("forecast request failed: {message}")]
    Forecast { message: String },

    /// Geocoding request failed
    #[error("geocoding request failed: {message}")]
    Geocode { message: String },
}

impl FetchError {
    /// Create a new fetch error for the given operation
    pub fn new(operation: FetchOperation, message: impl Into<String>) -> Self {
        let message = message.into();
        match operation {
            FetchOperation::CurrentWeather => Self::CurrentWeather { message },
            FetchOperation::Forecast => Self::Forecast { message },
            FetchOperation::Geocode => Self::Geocode { message },
        }
    }

    /// Which remote operation failed
    #[must_use]
    pub fn operation(&self) -> FetchOperation {
        match self {
            Self::CurrentWeather { .. } => FetchOperation::CurrentWeather,
            Self::Forecast { .. } => FetchOperation::Forecast,
            Self::Geocode { .. } => FetchOperation::Geocode,
        }
    }

    /// The single user-facing message shared by all fetch failures
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        "Failed to fetch weather data, please try again."
    }
}

/// Main error type for the Skycast dashboard
#[derive(Error, Debug)]
pub enum SkycastError {
    /// Geolocation failures
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Remote fetch failures
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SkycastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkycastError::Location(error) => error.to_string(),
            SkycastError::Fetch(error) => error.user_message().to_string(),
            SkycastError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            SkycastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_error_messages_are_fixed() {
        assert_eq!(
            LocationError::PermissionDenied.to_string(),
            "User denied the request for Geolocation. Please enable location services in your browser settings."
        );
        assert_eq!(
            LocationError::PositionUnavailable.to_string(),
            "Location information is unavailable."
        );
        assert_eq!(
            LocationError::Timeout.to_string(),
            "The request to get user location timed out."
        );
        assert_eq!(
            LocationError::Unsupported.to_string(),
            "Geolocation is not supported"
        );
        assert_eq!(
            LocationError::Unknown.to_string(),
            "An unknown error occurred."
        );
    }

    #[test]
    fn test_fetch_error_keeps_operation_granularity() {
        let error = FetchError::new(FetchOperation::Forecast, "HTTP 502");
        assert_eq!(error.operation(), FetchOperation::Forecast);
        assert!(error.to_string().contains("forecast request failed"));

        let error = FetchError::new(FetchOperation::Geocode, "timed out");
        assert_eq!(error.operation(), FetchOperation::Geocode);
    }

    #[test]
    fn test_all_fetch_errors_share_one_user_message() {
        for operation in [
            FetchOperation::CurrentWeather,
            FetchOperation::Forecast,
            FetchOperation::Geocode,
        ] {
            let error = FetchError::new(operation, "boom");
            assert_eq!(
                error.user_message(),
                "Failed to fetch weather data, please try again."
            );
        }
    }

    #[test]
    fn test_user_messages() {
        let config_err = SkycastError::config("missing API key");
        assert!(config_err.user_message().contains("Configuration error"));

        let location_err = SkycastError::from(LocationError::PermissionDenied);
        assert!(location_err.user_message().contains("denied the request"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let skycast_err: SkycastError = io_err.into();
        assert!(matches!(skycast_err, SkycastError::Io { .. }));
    }
}
