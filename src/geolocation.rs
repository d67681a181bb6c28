//! Geolocation acquisition with classified failures
//!
//! Wraps the host platform's location capability behind the [`PositionSource`]
//! trait and tracks the coordinates/error/loading triple the dashboard reads.
//! One acquisition is outstanding at a time; a newer `acquire` supersedes an
//! older in-flight one (most recent result wins).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{Duration, timeout};
use tracing::{debug, instrument, warn};

use crate::config::GeolocationConfig;
use crate::error::LocationError;
use crate::models::Coordinates;

/// Options handed to the platform capability for one position request
#[derive(Debug, Clone, Copy)]
pub struct PositionOptions {
    /// Request the most accurate position available
    pub high_accuracy: bool,
    /// Bounded wait for the position request
    pub timeout: Duration,
    /// Maximum acceptable age of a cached platform position
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(5),
            // A stale cached position must never satisfy a request.
            maximum_age: Duration::ZERO,
        }
    }
}

impl From<&GeolocationConfig> for PositionOptions {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: Duration::from_secs(config.timeout_seconds.into()),
            maximum_age: Duration::from_secs(config.maximum_age_seconds),
        }
    }
}

/// Raw failure codes reported by a platform position source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFailure {
    /// The user rejected the permission prompt
    PermissionDenied,
    /// The platform could not determine a position
    PositionUnavailable,
    /// The platform gave up waiting
    Timeout,
    /// Unclassified platform failure
    Unknown,
}

impl From<PositionFailure> for LocationError {
    fn from(failure: PositionFailure) -> Self {
        match failure {
            PositionFailure::PermissionDenied => LocationError::PermissionDenied,
            PositionFailure::PositionUnavailable => LocationError::PositionUnavailable,
            PositionFailure::Timeout => LocationError::Timeout,
            PositionFailure::Unknown => LocationError::Unknown,
        }
    }
}

/// Platform location capability
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Request the current position once
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Coordinates, PositionFailure>;
}

/// A source with a fixed position, e.g. configured by the host environment
pub struct StaticPositionSource {
    coordinates: Coordinates,
}

impl StaticPositionSource {
    /// Create a source that always reports the given position
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Coordinates::new(latitude, longitude),
        }
    }
}

#[async_trait]
impl PositionSource for StaticPositionSource {
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<Coordinates, PositionFailure> {
        Ok(self.coordinates)
    }
}

/// Build the platform source from configuration, when one is available
#[must_use]
pub fn source_from_config(config: &GeolocationConfig) -> Option<Arc<dyn PositionSource>> {
    match (config.latitude, config.longitude) {
        (Some(latitude), Some(longitude)) => {
            Some(Arc::new(StaticPositionSource::new(latitude, longitude)))
        }
        _ => None,
    }
}

/// Coordinates/error/loading triple read by consumers
#[derive(Debug, Clone, Default)]
pub struct GeolocationState {
    /// Last successfully acquired coordinates
    pub coordinates: Option<Coordinates>,
    /// Classified failure of the last acquisition
    pub error: Option<LocationError>,
    /// An acquisition is in progress
    pub loading: bool,
}

/// Tracks position acquisition against one platform source
pub struct GeolocationProvider {
    source: Option<Arc<dyn PositionSource>>,
    options: PositionOptions,
    state: Mutex<GeolocationState>,
    generation: AtomicU64,
}

impl GeolocationProvider {
    /// Create a provider in the initial loading state without acquiring yet
    #[must_use]
    pub fn new(source: Option<Arc<dyn PositionSource>>, options: PositionOptions) -> Self {
        Self {
            source,
            options,
            state: Mutex::new(GeolocationState {
                coordinates: None,
                error: None,
                loading: true,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Create a provider and run the automatic first acquisition
    pub async fn init(source: Option<Arc<dyn PositionSource>>, options: PositionOptions) -> Self {
        let provider = Self::new(source, options);
        provider.acquire().await;
        provider
    }

    /// Request the current position from the platform.
    ///
    /// Also serves as the manual re-acquire for user-triggered retry.
    #[instrument(skip(self))]
    pub async fn acquire(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
        }

        let Some(source) = self.source.clone() else {
            warn!("no location capability available");
            self.commit(generation, Err(LocationError::Unsupported));
            return;
        };

        let options = self.options;
        let result = match timeout(options.timeout, source.current_position(options)).await {
            Ok(Ok(coordinates)) if coordinates.is_valid() => Ok(coordinates),
            Ok(Ok(_)) => Err(LocationError::PositionUnavailable),
            Ok(Err(failure)) => Err(failure.into()),
            Err(_) => Err(LocationError::Timeout),
        };

        self.commit(generation, result);
    }

    /// Snapshot of the current acquisition state
    #[must_use]
    pub fn state(&self) -> GeolocationState {
        self.state.lock().clone()
    }

    /// Last successfully acquired coordinates, if any
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.state.lock().coordinates
    }

    fn commit(&self, generation: u64, result: Result<Coordinates, LocationError>) {
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("discarding superseded geolocation result");
            return;
        }

        let mut state = self.state.lock();
        match result {
            Ok(coordinates) => {
                debug!("acquired position {}", coordinates.format());
                *state = GeolocationState {
                    coordinates: Some(coordinates),
                    error: None,
                    loading: false,
                };
            }
            Err(error) => {
                warn!("geolocation failed: {error}");
                *state = GeolocationState {
                    coordinates: None,
                    error: Some(error),
                    loading: false,
                };
            }
        }
    }
}
