use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use skycast::dashboard::{DashboardView, WeatherDashboard};
use skycast::daily_summary::DailyForecastSummary;
use skycast::geolocation::{self, GeolocationProvider, PositionOptions};
use skycast::models::WeatherSnapshot;
use skycast::queries::WeatherQueries;
use skycast::{SkycastConfig, WeatherApiClient};

#[tokio::main]
async fn main() -> Result<()> {
    let config = SkycastConfig::load()?;
    init_tracing(&config);

    info!("starting skycast dashboard");

    let client = WeatherApiClient::new(&config)?;
    let queries = WeatherQueries::new(client, &config.cache);
    let source = geolocation::source_from_config(&config.geolocation);
    let provider =
        GeolocationProvider::init(source, PositionOptions::from(&config.geolocation)).await;
    let dashboard = WeatherDashboard::new(provider, queries);

    let view = dashboard.load().await;
    print_view(&view);

    Ok(())
}

fn init_tracing(config: &SkycastConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_view(view: &DashboardView) {
    match view {
        DashboardView::Loading => println!("Locating..."),
        DashboardView::Ready(snapshot) => {
            println!("{}", snapshot.location_label());
            print_current(&snapshot.weather);
            if !snapshot.upcoming_days().is_empty() {
                println!();
                println!("5-Day Forecast");
                for day in snapshot.upcoming_days() {
                    print_day(day);
                }
            }
        }
        failed => {
            if let Some(message) = failed.user_message() {
                println!("{message}");
            }
            if matches!(
                failed,
                DashboardView::LocationError(_) | DashboardView::LocationRequired
            ) {
                println!(
                    "Hint: set SKYCAST_GEOLOCATION__LATITUDE and SKYCAST_GEOLOCATION__LONGITUDE."
                );
            }
        }
    }
}

fn print_current(weather: &WeatherSnapshot) {
    let offset = chrono::FixedOffset::east_opt(weather.utc_offset_seconds)
        .unwrap_or_else(|| chrono::FixedOffset::east_opt(0).unwrap());
    println!(
        "{} (feels like {})  {}",
        WeatherSnapshot::format_temperature(weather.temperature),
        WeatherSnapshot::format_temperature(weather.feels_like),
        weather.condition.description,
    );
    println!(
        "  low {}  high {}  humidity {}%  wind {}",
        WeatherSnapshot::format_temperature(weather.temp_min),
        WeatherSnapshot::format_temperature(weather.temp_max),
        weather.humidity,
        weather.format_wind(),
    );
    println!(
        "  sunrise {}  sunset {}  pressure {} hPa",
        weather.sunrise.with_timezone(&offset).format("%-I:%M %p"),
        weather.sunset.with_timezone(&offset).format("%-I:%M %p"),
        weather.pressure,
    );
}

fn print_day(day: &DailyForecastSummary) {
    println!(
        "  {}  {} / {}  {}%  {:.2} m/s  {}",
        day.date.format("%a, %b %-d"),
        WeatherSnapshot::format_temperature(day.temp_min),
        WeatherSnapshot::format_temperature(day.temp_max),
        day.humidity,
        day.wind_speed,
        day.condition.description,
    );
}
