use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::{grain::ForecastProvider, models::WeatherForecast};

pub const FORECAST_ROUTE: &str = "/weatherforecast";
const FORECAST_ROUTE_ALIAS: &str = "/WeatherForecast";

/// Shared handler state: the provider every request forwards to.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ForecastProvider>,
}

impl AppState {
    pub fn new(provider: impl ForecastProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

/// Wire form of a forecast, carrying the derived Fahrenheit value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiForecast {
    pub date: NaiveDate,
    #[serde(rename = "temperatureC")]
    pub temperature_c: i32,
    #[serde(rename = "temperatureF")]
    pub temperature_f: i32,
    pub summary: Option<String>,
}

impl From<&WeatherForecast> for ApiForecast {
    fn from(forecast: &WeatherForecast) -> Self {
        Self {
            date: forecast.date,
            temperature_c: forecast.temperature_c,
            temperature_f: forecast.temperature_f(),
            summary: forecast.summary.clone(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(FORECAST_ROUTE, get(get_weather_forecast))
        .route(FORECAST_ROUTE_ALIAS, get(get_weather_forecast))
        .with_state(state)
}

#[instrument(name = "GetWeatherForecast", skip_all)]
async fn get_weather_forecast(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApiForecast>>, StatusCode> {
    let forecasts = state.provider.get_forecast().await.map_err(|e| {
        error!(error = %e, "Forecast provider call failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    debug!(count = forecasts.len(), "Forecasts received from provider");
    Ok(Json(forecasts.iter().map(ApiForecast::from).collect()))
}
