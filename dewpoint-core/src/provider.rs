use crate::{Config, ForecastRequest, HourlyForecast, provider::open_meteo::OpenMeteoProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

/// A source of hourly forecast series.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn hourly_forecast(&self, request: &ForecastRequest) -> anyhow::Result<HourlyForecast>;
}

/// Construct the forecast provider described by config.
pub fn provider_from_config(config: &Config) -> Box<dyn ForecastProvider> {
    Box::new(OpenMeteoProvider::new(config.forecast.base_url.clone()))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_uses_configured_base_url() {
        let mut cfg = Config::default();
        cfg.forecast.base_url = "http://localhost:8080".into();

        let provider = provider_from_config(&cfg);
        assert!(format!("{provider:?}").contains("http://localhost:8080"));
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_body_cuts_long_bodies_on_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
