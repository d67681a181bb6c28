//! Coordinate-keyed cached remote operations
//!
//! Three independent queries driven by coordinates: current weather, forecast,
//! and reverse geocode. Each is disabled while coordinates are absent or
//! invalid, and each caches per distinct coordinate key.

use tokio::time::Duration;

use crate::api::WeatherApiClient;
use crate::cache::QueryCache;
use crate::config::CacheConfig;
use crate::error::FetchError;
use crate::models::{Coordinates, ForecastSeries, GeocodingResult, WeatherSnapshot};

/// The three coordinate-driven queries plus their caches
pub struct WeatherQueries {
    client: WeatherApiClient,
    current: QueryCache<WeatherSnapshot>,
    forecast: QueryCache<ForecastSeries>,
    geocode: QueryCache<Vec<GeocodingResult>>,
}

impl WeatherQueries {
    /// Create the query set with the configured cache windows
    #[must_use]
    pub fn new(client: WeatherApiClient, cache: &CacheConfig) -> Self {
        let stale_after = Duration::from_secs(cache.stale_seconds);
        let retain_for = Duration::from_secs(cache.retention_seconds);
        Self {
            client,
            current: QueryCache::new(stale_after, retain_for),
            forecast: QueryCache::new(stale_after, retain_for),
            geocode: QueryCache::new(stale_after, retain_for),
        }
    }

    /// Current weather for `coords`; `Ok(None)` without a network call when
    /// coordinates are absent or invalid
    pub async fn current_weather(
        &self,
        coords: Option<Coordinates>,
    ) -> Result<Option<WeatherSnapshot>, FetchError> {
        let Some(coords) = usable(coords) else {
            return Ok(None);
        };
        let client = self.client.clone();
        self.current
            .fetch(&coords.cache_key(), move || async move {
                client.current_weather(coords).await
            })
            .await
            .map(Some)
    }

    /// Forecast series for `coords`; disabled without coordinates
    pub async fn forecast(
        &self,
        coords: Option<Coordinates>,
    ) -> Result<Option<ForecastSeries>, FetchError> {
        let Some(coords) = usable(coords) else {
            return Ok(None);
        };
        let client = self.client.clone();
        self.forecast
            .fetch(&coords.cache_key(), move || async move {
                client.forecast(coords).await
            })
            .await
            .map(Some)
    }

    /// Reverse geocode candidates for `coords`; disabled without coordinates
    pub async fn reverse_geocode(
        &self,
        coords: Option<Coordinates>,
    ) -> Result<Option<Vec<GeocodingResult>>, FetchError> {
        let Some(coords) = usable(coords) else {
            return Ok(None);
        };
        let client = self.client.clone();
        self.geocode
            .fetch(&coords.cache_key(), move || async move {
                client.reverse_geocode(coords).await
            })
            .await
            .map(Some)
    }

    /// Re-issue the current weather call, overwriting the cache on success
    pub async fn refetch_current_weather(
        &self,
        coords: Option<Coordinates>,
    ) -> Result<Option<WeatherSnapshot>, FetchError> {
        let Some(coords) = usable(coords) else {
            return Ok(None);
        };
        let client = self.client.clone();
        self.current
            .refetch(&coords.cache_key(), move || async move {
                client.current_weather(coords).await
            })
            .await
            .map(Some)
    }

    /// Re-issue the forecast call, overwriting the cache on success
    pub async fn refetch_forecast(
        &self,
        coords: Option<Coordinates>,
    ) -> Result<Option<ForecastSeries>, FetchError> {
        let Some(coords) = usable(coords) else {
            return Ok(None);
        };
        let client = self.client.clone();
        self.forecast
            .refetch(&coords.cache_key(), move || async move {
                client.forecast(coords).await
            })
            .await
            .map(Some)
    }

    /// Re-issue the reverse geocode call, overwriting the cache on success
    pub async fn refetch_reverse_geocode(
        &self,
        coords: Option<Coordinates>,
    ) -> Result<Option<Vec<GeocodingResult>>, FetchError> {
        let Some(coords) = usable(coords) else {
            return Ok(None);
        };
        let client = self.client.clone();
        self.geocode
            .refetch(&coords.cache_key(), move || async move {
                client.reverse_geocode(coords).await
            })
            .await
            .map(Some)
    }

    /// City search by name; uncached, keyed by nothing
    pub async fn search_city(&self, name: &str) -> Result<Vec<GeocodingResult>, FetchError> {
        self.client.search_city(name).await
    }

    /// Whether any of the three queries for `coords` is currently on the wire
    #[must_use]
    pub fn is_fetching(&self, coords: Option<Coordinates>) -> bool {
        usable(coords).is_some_and(|coords| {
            let key = coords.cache_key();
            self.current.status(&key).is_fetching
                || self.forecast.status(&key).is_fetching
                || self.geocode.status(&key).is_fetching
        })
    }
}

fn usable(coords: Option<Coordinates>) -> Option<Coordinates> {
    coords.filter(Coordinates::is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SkycastConfig;

    fn queries() -> WeatherQueries {
        // Port 9 (discard) is never listened on; any issued request would fail
        // loudly instead of returning Ok(None).
        let mut config = SkycastConfig::default();
        config.weather.api_key = Some("test-key-123".to_string());
        config.weather.base_url = "http://127.0.0.1:9".to_string();
        config.weather.geo_url = "http://127.0.0.1:9".to_string();
        let client = WeatherApiClient::new(&config).unwrap();
        WeatherQueries::new(client, &config.cache)
    }

    #[tokio::test]
    async fn absent_coordinates_short_circuit_all_queries() {
        let queries = queries();

        assert!(queries.current_weather(None).await.unwrap().is_none());
        assert!(queries.forecast(None).await.unwrap().is_none());
        assert!(queries.reverse_geocode(None).await.unwrap().is_none());
        assert!(queries.refetch_current_weather(None).await.unwrap().is_none());
        assert!(queries.refetch_forecast(None).await.unwrap().is_none());
        assert!(queries.refetch_reverse_geocode(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_coordinates_short_circuit_all_queries() {
        let queries = queries();
        let coords = Some(Coordinates::new(f64::NAN, 8.2275));

        assert!(queries.current_weather(coords).await.unwrap().is_none());
        assert!(queries.forecast(coords).await.unwrap().is_none());
        assert!(queries.reverse_geocode(coords).await.unwrap().is_none());
        assert!(!queries.is_fetching(coords));
    }
}
