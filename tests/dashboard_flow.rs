//! End-to-end dashboard flow against a mocked OpenWeather service

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skycast::dashboard::{DashboardView, WeatherDashboard};
use skycast::error::LocationError;
use skycast::geolocation::{
    GeolocationProvider, PositionOptions, PositionSource, StaticPositionSource,
};
use skycast::queries::WeatherQueries;
use skycast::{SkycastConfig, WeatherApiClient};

const LAT: f64 = 52.52;
const LON: f64 = 13.405;

fn weather_payload() -> serde_json::Value {
    json!({
        "coord": {"lon": LON, "lat": LAT},
        "weather": [{"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}],
        "main": {
            "temp": 9.4,
            "feels_like": 7.8,
            "temp_min": 8.0,
            "temp_max": 11.2,
            "pressure": 1019,
            "humidity": 70
        },
        "wind": {"speed": 5.2, "deg": 230},
        "dt": 1742896800,
        "sys": {"country": "DE", "sunrise": 1742879160, "sunset": 1742924520},
        "timezone": 3600,
        "name": "Berlin"
    })
}

fn forecast_payload() -> serde_json::Value {
    fn entry(dt: i64, temp: f64) -> serde_json::Value {
        json!({
            "dt": dt,
            "main": {
                "temp": temp,
                "feels_like": temp,
                "temp_min": temp,
                "temp_max": temp,
                "pressure": 1018,
                "humidity": 64
            },
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
            "wind": {"speed": 3.4, "deg": 190}
        })
    }

    // 2025-03-25 00:00, 06:00, 23:00 UTC and 2025-03-26 01:00 UTC
    json!({
        "list": [
            entry(1742860800, 10.0),
            entry(1742882400, 15.0),
            entry(1742943600, 5.0),
            entry(1742950800, 20.0)
        ],
        "city": {"name": "Berlin", "country": "DE", "timezone": 0}
    })
}

fn geocode_payload() -> serde_json::Value {
    json!([
        {"name": "Berlin", "lat": LAT, "lon": LON, "country": "DE"}
    ])
}

fn build_dashboard(server: &MockServer) -> WeatherDashboard {
    let mut config = SkycastConfig::default();
    config.weather.api_key = Some("test-key-123".to_string());
    config.weather.base_url = server.uri();
    config.weather.geo_url = server.uri();

    let client = WeatherApiClient::new(&config).expect("client builds");
    let queries = WeatherQueries::new(client, &config.cache);
    let source: Arc<dyn PositionSource> = Arc::new(StaticPositionSource::new(LAT, LON));
    let provider = GeolocationProvider::new(Some(source), PositionOptions::default());
    WeatherDashboard::new(provider, queries)
}

async fn mount(server: &MockServer, route: &str, template: ResponseTemplate, expect: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .expect(expect)
        .mount(server)
        .await;
}

#[tokio::test]
async fn dashboard_renders_weather_forecast_and_label() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(200).set_body_json(weather_payload()), 1).await;
    mount(&server, "/forecast", ResponseTemplate::new(200).set_body_json(forecast_payload()), 1).await;
    mount(&server, "/reverse", ResponseTemplate::new(200).set_body_json(geocode_payload()), 1).await;

    let dashboard = build_dashboard(&server);
    dashboard.geolocation().acquire().await;

    let snapshot = match dashboard.load().await {
        DashboardView::Ready(snapshot) => snapshot,
        other => panic!("expected ready view, got {other:?}"),
    };

    assert_eq!(snapshot.location_label(), "Berlin, DE");
    assert_eq!(snapshot.weather.temperature, 9.4);
    assert_eq!(snapshot.weather.country.as_deref(), Some("DE"));

    // Two local calendar days: the first widens to 5..15 and the second is
    // the single 01:00 sample.
    assert_eq!(snapshot.daily.len(), 2);
    assert_eq!(snapshot.daily[0].temp_min, 5.0);
    assert_eq!(snapshot.daily[0].temp_max, 15.0);
    assert_eq!(snapshot.daily[1].temp_min, 20.0);
    assert_eq!(snapshot.daily[1].temp_max, 20.0);
    assert_eq!(snapshot.upcoming_days().len(), 1);
}

#[tokio::test]
async fn failed_geocode_degrades_to_unknown_location() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(200).set_body_json(weather_payload()), 1).await;
    mount(&server, "/forecast", ResponseTemplate::new(200).set_body_json(forecast_payload()), 1).await;
    mount(&server, "/reverse", ResponseTemplate::new(500), 1).await;

    let dashboard = build_dashboard(&server);
    dashboard.geolocation().acquire().await;

    let snapshot = match dashboard.load().await {
        DashboardView::Ready(snapshot) => snapshot,
        other => panic!("expected ready view, got {other:?}"),
    };

    assert!(snapshot.location.is_none());
    assert_eq!(snapshot.location_label(), "Unknown Location");
    assert_eq!(snapshot.weather.humidity, 70);
}

#[tokio::test]
async fn failed_weather_fetch_collapses_to_the_generic_message() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(502), 1).await;
    mount(&server, "/forecast", ResponseTemplate::new(200).set_body_json(forecast_payload()), 1).await;
    mount(&server, "/reverse", ResponseTemplate::new(200).set_body_json(geocode_payload()), 1).await;

    let dashboard = build_dashboard(&server);
    dashboard.geolocation().acquire().await;

    let error = match dashboard.load().await {
        DashboardView::FetchFailed(error) => error,
        other => panic!("expected fetch failure, got {other:?}"),
    };

    assert_eq!(
        error.user_message(),
        "Failed to fetch weather data, please try again."
    );
}

#[tokio::test]
async fn concurrent_and_repeated_loads_hit_the_network_once_per_operation() {
    let server = MockServer::start().await;
    let delayed = |payload: serde_json::Value| {
        ResponseTemplate::new(200)
            .set_body_json(payload)
            .set_delay(Duration::from_millis(50))
    };
    mount(&server, "/weather", delayed(weather_payload()), 1).await;
    mount(&server, "/forecast", delayed(forecast_payload()), 1).await;
    mount(&server, "/reverse", delayed(geocode_payload()), 1).await;

    let dashboard = build_dashboard(&server);
    dashboard.geolocation().acquire().await;

    // Overlapping loads coalesce; a later load within the staleness window is
    // served from cache. The mocks enforce exactly one call per endpoint.
    let (first, second) = tokio::join!(dashboard.load(), dashboard.load());
    assert!(matches!(first, DashboardView::Ready(_)));
    assert!(matches!(second, DashboardView::Ready(_)));

    let third = dashboard.load().await;
    assert!(matches!(third, DashboardView::Ready(_)));
}

#[tokio::test]
async fn refresh_reissues_all_three_operations() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(200).set_body_json(weather_payload()), 2).await;
    mount(&server, "/forecast", ResponseTemplate::new(200).set_body_json(forecast_payload()), 2).await;
    mount(&server, "/reverse", ResponseTemplate::new(200).set_body_json(geocode_payload()), 2).await;

    let dashboard = build_dashboard(&server);
    dashboard.geolocation().acquire().await;

    assert!(matches!(dashboard.load().await, DashboardView::Ready(_)));
    // refresh must bypass the fresh cache for every operation
    assert!(matches!(dashboard.refresh().await, DashboardView::Ready(_)));
}

#[tokio::test]
async fn missing_location_capability_reports_unsupported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = SkycastConfig::default();
    config.weather.api_key = Some("test-key-123".to_string());
    config.weather.base_url = server.uri();
    config.weather.geo_url = server.uri();

    let client = WeatherApiClient::new(&config).expect("client builds");
    let queries = WeatherQueries::new(client, &config.cache);
    let provider = GeolocationProvider::init(None, PositionOptions::default()).await;
    let dashboard = WeatherDashboard::new(provider, queries);

    let error = match dashboard.load().await {
        DashboardView::LocationError(error) => error,
        other => panic!("expected location error, got {other:?}"),
    };
    assert_eq!(error, LocationError::Unsupported);
    assert_eq!(error.to_string(), "Geolocation is not supported");
}

#[tokio::test]
async fn city_view_uses_the_selection_as_label() {
    let server = MockServer::start().await;
    mount(&server, "/weather", ResponseTemplate::new(200).set_body_json(weather_payload()), 1).await;
    mount(&server, "/forecast", ResponseTemplate::new(200).set_body_json(forecast_payload()), 1).await;
    mount(&server, "/direct", ResponseTemplate::new(200).set_body_json(geocode_payload()), 1).await;

    let dashboard = build_dashboard(&server);

    let candidates = dashboard.search_city("Berlin").await.expect("search works");
    assert_eq!(candidates.len(), 1);

    let snapshot = match dashboard.city(&candidates[0]).await {
        DashboardView::Ready(snapshot) => snapshot,
        other => panic!("expected ready view, got {other:?}"),
    };
    assert_eq!(snapshot.location_label(), "Berlin, DE");
}
