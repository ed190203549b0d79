//! Weather collaborator — open-meteo current conditions.

use serde::Deserialize;
use thiserror::Error;

/// The open-meteo forecast endpoint. No API key required.
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Coordinates extracted from the model's tool call.
#[derive(Debug, Deserialize)]
pub struct WeatherArgs {
    pub latitude: f64,
    pub longitude: f64,
}

/// Weather collaborator failures. The original message is embedded so the
/// model sees what actually went wrong.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather API error: {reason}")]
    Request { reason: String },

    #[error("weather API returned no current conditions")]
    MissingCurrent,
}

/// Fetch current conditions (temperature, wind speed) for a coordinate pair.
///
/// Returns the API's `current` object as-is — the model is better at
/// summarizing the full mapping than any projection we would pick here.
pub async fn current_conditions(
    http: &reqwest::Client,
    args: &WeatherArgs,
) -> Result<serde_json::Value, WeatherError> {
    let response = http
        .get(FORECAST_URL)
        .query(&[
            ("latitude", args.latitude.to_string()),
            ("longitude", args.longitude.to_string()),
            ("current", "temperature_2m,wind_speed_10m".to_string()),
            (
                "hourly",
                "temperature_2m,relative_humidity_2m,wind_speed_10m".to_string(),
            ),
        ])
        .send()
        .await
        .map_err(|e| WeatherError::Request {
            reason: e.to_string(),
        })?;

    let response = response
        .error_for_status()
        .map_err(|e| WeatherError::Request {
            reason: e.to_string(),
        })?;

    let body: serde_json::Value = response.json().await.map_err(|e| WeatherError::Request {
        reason: e.to_string(),
    })?;

    body.get("current")
        .cloned()
        .ok_or(WeatherError::MissingCurrent)
}
