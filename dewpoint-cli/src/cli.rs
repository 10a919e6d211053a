use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dewpoint_core::{
    Config, Coordinates, DewPointCalculator, ForecastSession, ForecastState, LocationSource,
    Measurement, Url,
    dew_point::{MAX_PRECISION, validate_precision},
    location::{FixedLocation, IpLocation, NoLocation},
    provider::provider_from_config,
};
use inquire::{CustomType, CustomUserError, validator::Validation};

use crate::render;

/// Link used by `share` when no base is given.
const DEFAULT_SHARE_BASE: &str = "https://dewpoint.app/";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dewpoint", version, about = "Dew point calculator and forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Temperature and humidity overrides shared by several commands.
#[derive(Debug, Args)]
pub struct MeasurementArgs {
    /// Air temperature in °C (0-100).
    #[arg(long, short = 't', allow_negative_numbers = true)]
    temperature: Option<f64>,

    /// Relative humidity in % (0-100, exclusive of 0).
    #[arg(long, short = 'H')]
    humidity: Option<f64>,

    /// Share link to read `temperature` and `humidity` from.
    #[arg(long)]
    url: Option<Url>,
}

impl MeasurementArgs {
    /// Config defaults, then the share link, then explicit flags.
    /// Rejected values are ignored and the previous value is kept.
    fn calculator(&self, config: &Config) -> DewPointCalculator {
        let initial = match &self.url {
            Some(url) => Measurement::from_url(url),
            None => config.defaults,
        };

        let mut calc =
            DewPointCalculator::new(initial).with_precision(config.display.precision);
        if let Some(t) = self.temperature {
            calc.set_temperature(t);
        }
        if let Some(h) = self.humidity {
            calc.set_humidity(h);
        }
        calc
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a default location and display preferences.
    Configure,

    /// Calculate the dew point for a temperature and humidity.
    Calc {
        #[command(flatten)]
        measurement: MeasurementArgs,

        /// Decimal places (0-6); overrides the configured precision.
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_PRECISION as i64))]
        precision: Option<u32>,
    },

    /// Print a link that reopens the calculator with these values.
    Share {
        #[command(flatten)]
        measurement: MeasurementArgs,

        /// Base URL of the link.
        #[arg(long, default_value = DEFAULT_SHARE_BASE)]
        base: Url,
    },

    /// Show the hourly dew point forecast around the current hour.
    Forecast {
        #[command(flatten)]
        measurement: MeasurementArgs,

        /// Latitude in decimal degrees.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Estimate the location from the public IP address.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        ip: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config)?,
            Command::Calc {
                measurement,
                precision,
            } => {
                if let Some(p) = precision {
                    config.display.precision = p;
                }
                let calc = measurement.calculator(&config);
                print!("{}", render::measurement(&calc));
            }
            Command::Share { measurement, base } => {
                let calc = measurement.calculator(&config);
                println!("{}", calc.measurement().to_url(&base));
            }
            Command::Forecast {
                measurement,
                lat,
                lon,
                ip,
            } => {
                let calc = measurement.calculator(&config);
                let location = location_source(&config, lat.zip(lon), ip);

                let mut session =
                    ForecastSession::new(location, provider_from_config(&config)).with_window(
                        config.forecast.past_days,
                        config.forecast.forecast_days,
                    );

                let can_request = session.can_request();
                match session.show_forecast().await {
                    ForecastState::ForecastReady(report) => {
                        let view = render::ForecastView {
                            report,
                            local_dew_point: calc.dew_point(),
                            precision: config.display.precision,
                        };
                        print!("{view}");
                    }
                    ForecastState::LocationDenied(message) => {
                        eprintln!("{message}");
                        if !can_request {
                            eprintln!(
                                "Hint: pass --lat/--lon, use --ip, or run `dewpoint configure` to store a location."
                            );
                        }
                    }
                    ForecastState::ForecastFailed { .. } => {
                        eprintln!("Forecast is not available right now.");
                    }
                    other => {
                        tracing::debug!(state = other.name(), "forecast request ended early");
                    }
                }
            }
        }

        Ok(())
    }
}

fn location_source(
    config: &Config,
    explicit: Option<(f64, f64)>,
    ip: bool,
) -> Box<dyn LocationSource> {
    if let Some((latitude, longitude)) = explicit {
        return Box::new(FixedLocation::new(Coordinates {
            latitude,
            longitude,
        }));
    }
    if ip {
        return Box::new(IpLocation::default());
    }
    match config.default_coordinates() {
        Some(coordinates) => Box::new(FixedLocation::new(coordinates)),
        None => Box::new(NoLocation),
    }
}

fn within(
    range: std::ops::RangeInclusive<f64>,
    message: &'static str,
) -> impl Fn(&f64) -> Result<Validation, CustomUserError> + Clone {
    move |v: &f64| {
        Ok(if range.contains(v) {
            Validation::Valid
        } else {
            Validation::Invalid(message.into())
        })
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let current = config.default_coordinates();

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_default(current.map_or(0.0, |c| c.latitude))
        .with_validator(within(-90.0..=90.0, "Latitude must be within -90..=90"))
        .prompt()
        .context("Failed to read latitude")?;

    let longitude = CustomType::<f64>::new("Longitude:")
        .with_default(current.map_or(0.0, |c| c.longitude))
        .with_validator(within(-180.0..=180.0, "Longitude must be within -180..=180"))
        .prompt()
        .context("Failed to read longitude")?;

    let precision = CustomType::<u32>::new("Decimal places:")
        .with_default(config.display.precision.min(MAX_PRECISION))
        .with_validator(|p: &u32| -> Result<Validation, CustomUserError> {
            Ok(match validate_precision(*p) {
                Ok(_) => Validation::Valid,
                Err(err) => Validation::Invalid(err.to_string().into()),
            })
        })
        .prompt()
        .context("Failed to read precision")?;

    config.set_location(Coordinates {
        latitude,
        longitude,
    });
    config.display.precision = precision;
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dewpoint_core::Capability;

    const BERLIN: Coordinates = Coordinates {
        latitude: 52.52,
        longitude: 13.41,
    };

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["dewpoint"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    fn calc_args(args: &[&str]) -> MeasurementArgs {
        let mut argv = vec!["calc"];
        argv.extend_from_slice(args);
        match parse(&argv) {
            Command::Calc { measurement, .. } => measurement,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn configured() -> Config {
        let mut config = Config::default();
        config.set_location(BERLIN);
        config.defaults = Measurement {
            temperature: 18.0,
            humidity: 70.0,
        };
        config
    }

    #[test]
    fn explicit_coordinates_win_over_config() {
        let source = location_source(&configured(), Some((-33.87, 151.21)), false);
        assert_eq!(source.capability(), Capability::Available);
        assert!(format!("{source:?}").contains("-33.87"));
    }

    #[test]
    fn ip_flag_wins_over_config() {
        let source = location_source(&configured(), None, true);
        assert!(format!("{source:?}").starts_with("IpLocation"));
    }

    #[test]
    fn config_location_is_the_fallback() {
        let source = location_source(&configured(), None, false);
        let debug = format!("{source:?}");
        assert!(debug.starts_with("FixedLocation"));
        assert!(debug.contains("52.52"));
    }

    #[test]
    fn no_location_without_flags_or_config() {
        let source = location_source(&Config::default(), None, false);
        assert_eq!(source.capability(), Capability::Unavailable);
    }

    #[test]
    fn calculator_starts_from_config_defaults() {
        let calc = calc_args(&[]).calculator(&configured());
        assert_eq!(calc.measurement(), configured().defaults);
    }

    #[test]
    fn share_link_replaces_config_defaults() {
        let calc = calc_args(&["--url", "https://dewpoint.app/?temperature=20&humidity=50"])
            .calculator(&configured());
        assert_eq!(
            calc.measurement(),
            Measurement {
                temperature: 20.0,
                humidity: 50.0,
            }
        );
    }

    #[test]
    fn flags_override_share_link() {
        let calc = calc_args(&[
            "--url",
            "https://dewpoint.app/?temperature=20&humidity=50",
            "-t",
            "25",
        ])
        .calculator(&configured());
        assert_eq!(calc.measurement().temperature, 25.0);
        assert_eq!(calc.measurement().humidity, 50.0);
    }

    #[test]
    fn rejected_flag_keeps_previous_value() {
        let calc = calc_args(&["--temperature", "150", "--humidity", "0"]).calculator(&configured());
        assert_eq!(calc.measurement(), configured().defaults);
    }

    #[test]
    fn precision_flag_is_bounded() {
        assert!(matches!(
            parse(&["calc", "--precision", "6"]),
            Command::Calc {
                precision: Some(6),
                ..
            }
        ));

        let err = Cli::try_parse_from(["dewpoint", "calc", "--precision", "7"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(Cli::try_parse_from(["dewpoint", "calc", "--precision", "400"]).is_err());
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["dewpoint", "forecast", "--lat", "10"]).is_err());
        match parse(&["forecast", "--lat", "-10.5", "--lon", "20"]) {
            Command::Forecast { lat, lon, ip, .. } => {
                assert_eq!(lat.zip(lon), Some((-10.5, 20.0)));
                assert!(!ip);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
