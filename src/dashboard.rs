//! Dashboard orchestration: geolocation plus the three weather queries
//!
//! Drives the flow a consumer renders from: acquire a position, fire the
//! current-weather/forecast/reverse-geocode queries concurrently, and fold
//! their independent outcomes into one view. Partial data is a valid state;
//! only a failed weather or forecast query degrades the whole view.

use tracing::{debug, info};

use crate::daily_summary::{DailyForecastSummary, FORECAST_DAYS, next_days};
use crate::error::{FetchError, LocationError};
use crate::geolocation::GeolocationProvider;
use crate::models::{Coordinates, ForecastSeries, GeocodingResult, WeatherSnapshot};
use crate::queries::WeatherQueries;

/// Everything a renderer needs for a fully loaded dashboard
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// Coordinates the queries were keyed by
    pub coordinates: Coordinates,
    /// Current conditions
    pub weather: WeatherSnapshot,
    /// Raw forecast series
    pub forecast: ForecastSeries,
    /// Per-day aggregation of the forecast series
    pub daily: Vec<DailyForecastSummary>,
    /// Best reverse-geocode candidate, when the lookup succeeded
    pub location: Option<GeocodingResult>,
}

impl DashboardSnapshot {
    /// Location label for display; geocode failure degrades to a fixed
    /// placeholder, never an error
    #[must_use]
    pub fn location_label(&self) -> String {
        self.location
            .as_ref()
            .map(GeocodingResult::display_label)
            .unwrap_or_else(|| "Unknown Location".to_string())
    }

    /// The day-ahead forecast window (up to five days after today)
    #[must_use]
    pub fn upcoming_days(&self) -> &[DailyForecastSummary] {
        next_days(&self.daily, FORECAST_DAYS)
    }
}

/// What the dashboard has to show right now
#[derive(Debug, Clone)]
pub enum DashboardView {
    /// Position acquisition still in progress
    Loading,
    /// Position acquisition failed; retry via `acquire`
    LocationError(LocationError),
    /// No position available and no classified error
    LocationRequired,
    /// Current weather or forecast failed; retry via `refresh`
    FetchFailed(FetchError),
    /// All required data present
    Ready(DashboardSnapshot),
}

impl DashboardView {
    /// User-facing message for the failure views
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            DashboardView::LocationError(error) => Some(error.to_string()),
            DashboardView::LocationRequired => {
                Some("Please enable location access to see your local weather.".to_string())
            }
            DashboardView::FetchFailed(error) => Some(error.user_message().to_string()),
            DashboardView::Loading | DashboardView::Ready(_) => None,
        }
    }
}

/// Ties the geolocation provider and the cached queries together
pub struct WeatherDashboard {
    geolocation: GeolocationProvider,
    queries: WeatherQueries,
}

impl WeatherDashboard {
    /// Create a dashboard over an initialized provider and query set
    #[must_use]
    pub fn new(geolocation: GeolocationProvider, queries: WeatherQueries) -> Self {
        Self {
            geolocation,
            queries,
        }
    }

    /// The geolocation provider, for direct retry affordances
    #[must_use]
    pub fn geolocation(&self) -> &GeolocationProvider {
        &self.geolocation
    }

    /// Build the view for the current position, serving cached query results
    pub async fn load(&self) -> DashboardView {
        self.view(false).await
    }

    /// Re-acquire the position and re-issue all three queries unconditionally
    pub async fn refresh(&self) -> DashboardView {
        info!("refreshing dashboard");
        self.geolocation.acquire().await;
        self.view(true).await
    }

    /// Whether any query for the current position is on the wire
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.queries.is_fetching(self.geolocation.coordinates())
    }

    /// Search for cities matching `name`
    pub async fn search_city(&self, name: &str) -> Result<Vec<GeocodingResult>, FetchError> {
        self.queries.search_city(name).await
    }

    /// Build the view for a searched city; the selection itself provides the
    /// label, so no reverse geocode is issued
    pub async fn city(&self, selection: &GeocodingResult) -> DashboardView {
        let coords = selection.coordinates;
        let (weather, forecast) = tokio::join!(
            self.queries.current_weather(Some(coords)),
            self.queries.forecast(Some(coords)),
        );
        self.assemble(coords, weather, forecast, Some(selection.clone()))
    }

    async fn view(&self, force: bool) -> DashboardView {
        let state = self.geolocation.state();
        if state.loading {
            return DashboardView::Loading;
        }
        if let Some(error) = state.error {
            return DashboardView::LocationError(error);
        }
        let Some(coords) = state.coordinates else {
            return DashboardView::LocationRequired;
        };

        // The three fetches fire in parallel and resolve independently.
        let (weather, forecast, geocode) = if force {
            tokio::join!(
                self.queries.refetch_current_weather(Some(coords)),
                self.queries.refetch_forecast(Some(coords)),
                self.queries.refetch_reverse_geocode(Some(coords)),
            )
        } else {
            tokio::join!(
                self.queries.current_weather(Some(coords)),
                self.queries.forecast(Some(coords)),
                self.queries.reverse_geocode(Some(coords)),
            )
        };

        // A failed or empty geocode only costs the label.
        let location = match geocode {
            Ok(candidates) => candidates.unwrap_or_default().into_iter().next(),
            Err(error) => {
                debug!("reverse geocode failed: {error}");
                None
            }
        };

        self.assemble(coords, weather, forecast, location)
    }

    fn assemble(
        &self,
        coords: Coordinates,
        weather: Result<Option<WeatherSnapshot>, FetchError>,
        forecast: Result<Option<ForecastSeries>, FetchError>,
        location: Option<GeocodingResult>,
    ) -> DashboardView {
        let weather = match weather {
            Ok(Some(weather)) => weather,
            Ok(None) => return DashboardView::LocationRequired,
            Err(error) => return DashboardView::FetchFailed(error),
        };
        let forecast = match forecast {
            Ok(Some(forecast)) => forecast,
            Ok(None) => return DashboardView::LocationRequired,
            Err(error) => return DashboardView::FetchFailed(error),
        };

        let daily = forecast.daily_summaries();
        DashboardView::Ready(DashboardSnapshot {
            coordinates: coords,
            weather,
            forecast,
            daily,
            location,
        })
    }
}
