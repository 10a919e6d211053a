//! Hourly forecast series and lookup of values around a reference hour.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike, Utc};
use thiserror::Error;
use tracing::debug;

use crate::{dew_point::format_rounded, model::Coordinates};

/// Placeholder rendered for a value that cannot be looked up.
pub const UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    #[error("{variable} has {actual} values but the forecast has {expected} timestamps")]
    Misaligned {
        variable: ForecastVariable,
        expected: usize,
        actual: usize,
    },

    #[error("invalid forecast timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("invalid UTC offset of {0} seconds")]
    InvalidOffset(i32),
}

/// Hourly variables requested from the provider.
///
/// The declaration order matches the order they are requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastVariable {
    Temperature2m,
    RelativeHumidity2m,
    DewPoint2m,
    Temperature80m,
    Temperature120m,
    Temperature180m,
}

impl ForecastVariable {
    pub const fn all() -> &'static [ForecastVariable] {
        &[
            ForecastVariable::Temperature2m,
            ForecastVariable::RelativeHumidity2m,
            ForecastVariable::DewPoint2m,
            ForecastVariable::Temperature80m,
            ForecastVariable::Temperature120m,
            ForecastVariable::Temperature180m,
        ]
    }

    /// Name used by the Open-Meteo `hourly` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastVariable::Temperature2m => "temperature_2m",
            ForecastVariable::RelativeHumidity2m => "relative_humidity_2m",
            ForecastVariable::DewPoint2m => "dew_point_2m",
            ForecastVariable::Temperature80m => "temperature_80m",
            ForecastVariable::Temperature120m => "temperature_120m",
            ForecastVariable::Temperature180m => "temperature_180m",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ForecastVariable::Temperature2m => "Temperature (2m)",
            ForecastVariable::RelativeHumidity2m => "Humidity (2m)",
            ForecastVariable::DewPoint2m => "Dew point (2m)",
            ForecastVariable::Temperature80m => "Temperature (80m)",
            ForecastVariable::Temperature120m => "Temperature (120m)",
            ForecastVariable::Temperature180m => "Temperature (180m)",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ForecastVariable::RelativeHumidity2m => "%",
            _ => "℃",
        }
    }
}

impl std::fmt::Display for ForecastVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects one entry of an [`HourlyForecast`]: the hour matching
/// `reference_time`, shifted by `offset_hours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastQuery {
    pub reference_time: DateTime<Utc>,
    pub offset_hours: i64,
}

impl ForecastQuery {
    pub fn at(reference_time: DateTime<Utc>) -> Self {
        Self {
            reference_time,
            offset_hours: 0,
        }
    }

    pub fn shifted(self, offset_hours: i64) -> Self {
        Self {
            offset_hours,
            ..self
        }
    }
}

/// Raw series as received from a provider, before alignment is checked.
#[derive(Debug, Clone, Default)]
pub struct RawSeries {
    pub temperature_2m: Vec<Option<f32>>,
    pub relative_humidity_2m: Vec<Option<f32>>,
    pub dew_point_2m: Vec<Option<f32>>,
    pub temperature_80m: Vec<Option<f32>>,
    pub temperature_120m: Vec<Option<f32>>,
    pub temperature_180m: Vec<Option<f32>>,
}

/// Hourly forecast with every series index-aligned to `time`.
///
/// Timestamps are wall-clock times in the forecast's own timezone.
#[derive(Debug, Clone)]
pub struct HourlyForecast {
    coordinates: Coordinates,
    timezone: String,
    timezone_abbreviation: String,
    utc_offset: FixedOffset,
    time: Vec<NaiveDateTime>,
    series: RawSeries,
}

impl HourlyForecast {
    pub fn new(
        coordinates: Coordinates,
        timezone: String,
        timezone_abbreviation: String,
        utc_offset_seconds: i32,
        time: Vec<NaiveDateTime>,
        series: RawSeries,
    ) -> Result<Self, ForecastError> {
        let utc_offset = FixedOffset::east_opt(utc_offset_seconds)
            .ok_or(ForecastError::InvalidOffset(utc_offset_seconds))?;

        let forecast = Self {
            coordinates,
            timezone,
            timezone_abbreviation,
            utc_offset,
            time,
            series,
        };

        for &variable in ForecastVariable::all() {
            let actual = forecast.series(variable).len();
            if actual != forecast.time.len() {
                return Err(ForecastError::Misaligned {
                    variable,
                    expected: forecast.time.len(),
                    actual,
                });
            }
        }

        Ok(forecast)
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn timezone_abbreviation(&self) -> &str {
        &self.timezone_abbreviation
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.time
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn series(&self, variable: ForecastVariable) -> &[Option<f32>] {
        let s = &self.series;
        match variable {
            ForecastVariable::Temperature2m => &s.temperature_2m,
            ForecastVariable::RelativeHumidity2m => &s.relative_humidity_2m,
            ForecastVariable::DewPoint2m => &s.dew_point_2m,
            ForecastVariable::Temperature80m => &s.temperature_80m,
            ForecastVariable::Temperature120m => &s.temperature_120m,
            ForecastVariable::Temperature180m => &s.temperature_180m,
        }
    }

    /// `reference` as wall-clock time in the forecast's timezone.
    pub fn local_time(&self, reference: DateTime<Utc>) -> NaiveDateTime {
        reference.with_timezone(&self.utc_offset).naive_local()
    }

    /// Index of the hour containing the query's reference time, or `None`.
    pub fn reference_index(&self, query: &ForecastQuery) -> Option<usize> {
        let index = find_reference_index(&self.time, self.local_time(query.reference_time));
        if index.is_none() {
            debug!(reference = %query.reference_time, "reference hour not in forecast");
        }
        index
    }

    fn query_index(&self, query: &ForecastQuery) -> Option<usize> {
        let base = self.reference_index(query)?;
        offset_index(self.time.len(), base, query.offset_hours)
    }

    /// Local timestamp selected by `query`.
    pub fn time(&self, query: &ForecastQuery) -> Option<NaiveDateTime> {
        self.query_index(query).map(|i| self.time[i])
    }

    /// Value of `variable` selected by `query`.
    pub fn value(&self, variable: ForecastVariable, query: &ForecastQuery) -> Option<f32> {
        let base = self.reference_index(query)?;
        offset_value(self.series(variable), base, query.offset_hours)
    }
}

/// Position of the entry sharing `reference`'s calendar date and hour.
///
/// Minutes and seconds are ignored. `None` means no entry matched, which is
/// distinct from a match at index 0.
pub fn find_reference_index(timestamps: &[NaiveDateTime], reference: NaiveDateTime) -> Option<usize> {
    timestamps
        .iter()
        .position(|t| t.date() == reference.date() && t.hour() == reference.hour())
}

/// `base + offset` if it lies in `0..len`.
pub fn offset_index(len: usize, base: usize, offset: i64) -> Option<usize> {
    let target = i64::try_from(base).ok()?.checked_add(offset)?;
    let target = usize::try_from(target).ok()?;
    (target < len).then_some(target)
}

/// Sample at `base + offset`; out-of-range and missing samples are `None`.
pub fn offset_value(series: &[Option<f32>], base: usize, offset: i64) -> Option<f32> {
    let index = offset_index(series.len(), base, offset)?;
    series[index]
}

/// Fixed-precision display text, or [`UNAVAILABLE`].
///
/// Rounds the same way as the calculator so both sides of a comparison agree.
pub fn format_value(value: Option<f32>, precision: u32) -> String {
    match value {
        Some(v) => format_rounded(f64::from(v), precision),
        None => UNAVAILABLE.to_string(),
    }
}
