//! Share links: a measurement encoded as `?temperature=..&humidity=..`.

use reqwest::Url;
use tracing::debug;

use crate::model::{
    DEFAULT_HUMIDITY, DEFAULT_TEMPERATURE, Measurement, validate_humidity, validate_temperature,
};

pub const TEMPERATURE_PARAM: &str = "temperature";
pub const HUMIDITY_PARAM: &str = "humidity";

impl Measurement {
    /// Read `temperature` and `humidity` from the query string of `url`.
    ///
    /// Each parameter that is missing, non-numeric or out of range is
    /// replaced by its default independently of the other.
    pub fn from_url(url: &Url) -> Self {
        let mut temperature = None;
        let mut humidity = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                TEMPERATURE_PARAM => temperature = Some(value.into_owned()),
                HUMIDITY_PARAM => humidity = Some(value.into_owned()),
                _ => {}
            }
        }

        Self {
            temperature: parse_param(TEMPERATURE_PARAM, temperature, validate_temperature)
                .unwrap_or(DEFAULT_TEMPERATURE),
            humidity: parse_param(HUMIDITY_PARAM, humidity, validate_humidity)
                .unwrap_or(DEFAULT_HUMIDITY),
        }
    }

    /// Copy of `base` with this measurement's parameters set, replacing any
    /// previous values and keeping unrelated parameters.
    pub fn to_url(&self, base: &Url) -> Url {
        let kept: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(k, _)| k != TEMPERATURE_PARAM && k != HUMIDITY_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut url = base.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(TEMPERATURE_PARAM, &self.temperature.to_string())
            .append_pair(HUMIDITY_PARAM, &self.humidity.to_string());
        url
    }
}

fn parse_param<E: std::fmt::Display>(
    name: &str,
    raw: Option<String>,
    validate: impl Fn(f64) -> Result<f64, E>,
) -> Option<f64> {
    let raw = raw?;
    let parsed = match raw.trim().parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            debug!(param = name, value = %raw, "non-numeric query parameter");
            return None;
        }
    };
    match validate(parsed) {
        Ok(v) => Some(v),
        Err(err) => {
            debug!(param = name, %err, "query parameter rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn decodes_both_parameters() {
        let m = Measurement::from_url(&url("https://dew.example/?temperature=20.5&humidity=50"));
        assert_eq!(m.temperature, 20.5);
        assert_eq!(m.humidity, 50.0);
    }

    #[test]
    fn missing_parameters_use_defaults() {
        let m = Measurement::from_url(&url("https://dew.example/"));
        assert_eq!(m, Measurement::default());
    }

    #[test]
    fn bad_parameters_fall_back_independently() {
        let m = Measurement::from_url(&url("https://dew.example/?temperature=hot&humidity=40"));
        assert_eq!(m.temperature, 28.0);
        assert_eq!(m.humidity, 40.0);

        let m = Measurement::from_url(&url("https://dew.example/?temperature=15&humidity=140"));
        assert_eq!(m.temperature, 15.0);
        assert_eq!(m.humidity, 64.0);

        let m = Measurement::from_url(&url("https://dew.example/?temperature=NaN&humidity=0"));
        assert_eq!(m, Measurement::default());

        let m = Measurement::from_url(&url("https://dew.example/?temperature=-4&humidity="));
        assert_eq!(m, Measurement::default());
    }

    #[test]
    fn share_link_round_trip() {
        let base = url("https://dew.example/app?lang=en&temperature=1");
        let original = Measurement {
            temperature: 23.7,
            humidity: 81.25,
        };

        let shared = original.to_url(&base);
        assert_eq!(
            shared.query(),
            Some("lang=en&temperature=23.7&humidity=81.25")
        );

        let decoded = Measurement::from_url(&shared);
        assert!((decoded.temperature - original.temperature).abs() < 1e-9);
        assert!((decoded.humidity - original.humidity).abs() < 1e-9);
    }
}
