//! Magnus–Tetens dew point approximation.

use std::ops::RangeInclusive;

use thiserror::Error;

/// Magnus coefficient `b` (dimensionless).
pub const MAGNUS_B: f64 = 17.625;

/// Magnus coefficient `c` in °C.
pub const MAGNUS_C: f64 = 243.04;

/// Decimal places used when a precision is not configured.
pub const DEFAULT_PRECISION: u32 = 1;

/// Largest supported number of decimal places.
pub const MAX_PRECISION: u32 = 6;

/// Accepted range for user-entered temperature (°C).
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Accepted range for user-entered relative humidity (%).
pub const HUMIDITY_RANGE: RangeInclusive<f64> = 0.0..=100.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DewPointError {
    #[error("relative humidity must be greater than 0%, got {0}")]
    NonPositiveHumidity(f64),

    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} {value} is outside the accepted range {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("precision {0} exceeds the maximum of {} decimal places", MAX_PRECISION)]
    PrecisionTooLarge(u32),

    #[error("dew point is undefined for temperature {temperature} and humidity {humidity}")]
    Undefined { temperature: f64, humidity: f64 },
}

fn gamma(temperature: f64, humidity: f64) -> f64 {
    (humidity / 100.0).ln() + (MAGNUS_B * temperature) / (MAGNUS_C + temperature)
}

/// Dew point in °C for an air temperature (°C) and relative humidity (%).
///
/// The result is unrounded; use [`round_to`] for display.
pub fn compute_dew_point(temperature: f64, humidity: f64) -> Result<f64, DewPointError> {
    ensure_finite("temperature", temperature)?;
    ensure_finite("humidity", humidity)?;
    if humidity <= 0.0 {
        return Err(DewPointError::NonPositiveHumidity(humidity));
    }

    let g = gamma(temperature, humidity);
    let dew_point = (MAGNUS_C * g) / (MAGNUS_B - g);

    if dew_point.is_finite() {
        Ok(dew_point)
    } else {
        Err(DewPointError::Undefined {
            temperature,
            humidity,
        })
    }
}

/// Round to `decimals` places, ties toward positive infinity.
///
/// A machine epsilon is added first so values such as `1.005`, stored as
/// `1.00499...`, still round up. `decimals` is capped at [`MAX_PRECISION`]
/// and a negative zero result is returned as `0.0`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_PRECISION) as i32);
    let rounded = ((value + f64::EPSILON) * factor + 0.5).floor() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// [`round_to`] rendered with exactly `decimals` fractional digits.
pub fn format_rounded(value: f64, decimals: u32) -> String {
    let decimals = decimals.min(MAX_PRECISION);
    let places = decimals as usize;
    format!("{:.places$}", round_to(value, decimals))
}

/// Check a display precision against [`MAX_PRECISION`].
pub fn validate_precision(precision: u32) -> Result<u32, DewPointError> {
    if precision > MAX_PRECISION {
        return Err(DewPointError::PrecisionTooLarge(precision));
    }
    Ok(precision)
}

/// Check a user-entered value against its accepted range.
pub fn validate_input(
    name: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<f64, DewPointError> {
    ensure_finite(name, value)?;
    if !range.contains(&value) {
        return Err(DewPointError::OutOfRange {
            name,
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }
    Ok(value)
}

fn ensure_finite(name: &'static str, value: f64) -> Result<(), DewPointError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DewPointError::NotFinite { name, value })
    }
}
