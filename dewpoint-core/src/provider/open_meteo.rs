use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    forecast::{ForecastError, ForecastVariable, HourlyForecast, RawSeries},
    model::{Coordinates, ForecastRequest},
};

use super::{ForecastProvider, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/forecast", self.base_url.trim_end_matches('/'))
    }
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL.to_string())
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn hourly_forecast(&self, request: &ForecastRequest) -> Result<HourlyForecast> {
        let url = self.endpoint();
        info!(
            latitude = request.coordinates.latitude,
            longitude = request.coordinates.longitude,
            "fetching hourly forecast"
        );

        let res = self
            .http
            .get(&url)
            .query(&query_params(request))
            .send()
            .await
            .context("Failed to send request to Open-Meteo")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let forecast = parse_forecast(&body)?;
        debug!(hours = forecast.len(), timezone = forecast.timezone(), "forecast received");
        Ok(forecast)
    }
}

fn query_params(request: &ForecastRequest) -> Vec<(&'static str, String)> {
    let hourly = ForecastVariable::all()
        .iter()
        .map(ForecastVariable::as_str)
        .collect::<Vec<_>>()
        .join(",");

    vec![
        ("latitude", request.coordinates.latitude.to_string()),
        ("longitude", request.coordinates.longitude.to_string()),
        ("hourly", hourly),
        ("timezone", "auto".to_string()),
        ("past_days", request.past_days.to_string()),
        ("forecast_days", request.forecast_days.to_string()),
    ]
}

/// Parse an Open-Meteo `/v1/forecast` JSON body.
pub fn parse_forecast(body: &str) -> Result<HourlyForecast> {
    let parsed: OmForecastResponse =
        serde_json::from_str(body).context("Failed to parse Open-Meteo forecast JSON")?;

    let time = parsed
        .hourly
        .time
        .iter()
        .map(|t| {
            NaiveDateTime::parse_from_str(t, TIME_FORMAT)
                .map_err(|_| ForecastError::InvalidTimestamp(t.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let hourly = parsed.hourly;
    let series = RawSeries {
        temperature_2m: hourly.temperature_2m,
        relative_humidity_2m: hourly.relative_humidity_2m,
        dew_point_2m: hourly.dew_point_2m,
        temperature_80m: hourly.temperature_80m,
        temperature_120m: hourly.temperature_120m,
        temperature_180m: hourly.temperature_180m,
    };

    let forecast = HourlyForecast::new(
        Coordinates {
            latitude: parsed.latitude,
            longitude: parsed.longitude,
        },
        parsed.timezone,
        parsed.timezone_abbreviation,
        parsed.utc_offset_seconds,
        time,
        series,
    )?;

    Ok(forecast)
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f32>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f32>>,
    #[serde(default)]
    dew_point_2m: Vec<Option<f32>>,
    #[serde(default)]
    temperature_80m: Vec<Option<f32>>,
    #[serde(default)]
    temperature_120m: Vec<Option<f32>>,
    #[serde(default)]
    temperature_180m: Vec<Option<f32>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    latitude: f64,
    longitude: f64,
    utc_offset_seconds: i32,
    timezone: String,
    #[serde(default)]
    timezone_abbreviation: String,
    hourly: OmHourly,
}
