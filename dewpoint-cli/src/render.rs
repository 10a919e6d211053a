//! Plain-text tables for terminal output.

use std::fmt;

use dewpoint_core::{
    DewPointCalculator, ForecastReport, ForecastVariable,
    dew_point::format_rounded,
    forecast::{UNAVAILABLE, format_value},
};

/// Hours before and after the reference hour shown in the window table.
const WINDOW: std::ops::RangeInclusive<i64> = -1..=3;

pub fn measurement(calc: &DewPointCalculator) -> String {
    let m = calc.measurement();
    format!(
        "Temperature: {}℃\nHumidity:    {}%\nDew point:   {}℃\n",
        m.temperature,
        m.humidity,
        calc.rounded_dew_point()
    )
}

/// Dew point window, current values and location footer.
pub struct ForecastView<'a> {
    pub report: &'a ForecastReport,
    /// Dew point from the calculator, shown next to the current hour.
    pub local_dew_point: f64,
    pub precision: u32,
}

impl fmt::Display for ForecastView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let forecast = &self.report.forecast;
        let query = self.report.query();

        writeln!(f, "Time    Dew Point")?;
        for offset in WINDOW {
            let q = query.shifted(offset);
            let time = forecast
                .time(&q)
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| UNAVAILABLE.to_string());
            let dew = format_value(forecast.value(ForecastVariable::DewPoint2m, &q), self.precision);

            write!(f, "{time:<8}{dew}℃")?;
            if offset == 0 {
                write!(f, " vs {}℃", format_rounded(self.local_dew_point, self.precision))?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;

        writeln!(f, "Key                 Value")?;
        for &variable in ForecastVariable::all() {
            let value = format_value(forecast.value(variable, &query), self.precision);
            writeln!(f, "{:<20}{}{}", variable.label(), value, variable.unit())?;
        }
        writeln!(f)?;

        let coordinates = self.report.position.coordinates;
        writeln!(f, "Latitude: {}", coordinates.latitude)?;
        writeln!(f, "Longitude: {}", coordinates.longitude)?;
        writeln!(f, "Timezone: {}", forecast.timezone())?;
        if let Some(accuracy) = self.report.position.accuracy_m {
            writeln!(f, "Accuracy: {accuracy:.0} m")?;
        }
        writeln!(f, "Map: {}", coordinates.map_url())?;
        writeln!(f)?;
        writeln!(f, "Powered by Open-Meteo")
    }
}
