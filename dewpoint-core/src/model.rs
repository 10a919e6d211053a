use serde::{Deserialize, Serialize};

use crate::dew_point::{self, DewPointError, HUMIDITY_RANGE, TEMPERATURE_RANGE};

/// Temperature used when none is supplied (°C).
pub const DEFAULT_TEMPERATURE: f64 = 28.0;

/// Relative humidity used when none is supplied (%).
pub const DEFAULT_HUMIDITY: f64 = 64.0;

/// A temperature / relative humidity pair as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for Measurement {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            humidity: DEFAULT_HUMIDITY,
        }
    }
}

impl Measurement {
    /// Build a measurement whose inputs are in range and computable.
    pub fn new(temperature: f64, humidity: f64) -> Result<Self, DewPointError> {
        let temperature = validate_temperature(temperature)?;
        let humidity = validate_humidity(humidity)?;
        Ok(Self {
            temperature,
            humidity,
        })
    }

    /// Unrounded dew point in °C.
    pub fn dew_point(&self) -> Result<f64, DewPointError> {
        dew_point::compute_dew_point(self.temperature, self.humidity)
    }
}

pub(crate) fn validate_temperature(value: f64) -> Result<f64, DewPointError> {
    dew_point::validate_input("temperature", value, &TEMPERATURE_RANGE)
}

/// Humidity must be in range and strictly positive; 0 % has no dew point.
pub(crate) fn validate_humidity(value: f64) -> Result<f64, DewPointError> {
    let value = dew_point::validate_input("humidity", value, &HUMIDITY_RANGE)?;
    if value <= 0.0 {
        return Err(DewPointError::NonPositiveHumidity(value));
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn map_url(&self) -> String {
        format!(
            "https://www.google.com/maps/@{},{},18z",
            self.latitude, self.longitude
        )
    }
}

/// A resolved location fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    /// Radius of uncertainty in metres, when the source reports one.
    pub accuracy_m: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub coordinates: Coordinates,
    pub past_days: u8,
    pub forecast_days: u8,
}
