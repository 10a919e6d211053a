//! Core library for the `dewpoint` CLI.
//!
//! This crate defines:
//! - The Magnus dew point formula and a stateful calculator around it
//! - Hourly forecast series and lookup around a reference hour
//! - Abstractions over forecast providers and location sources
//! - Configuration handling
//!
//! It is used by `dewpoint-cli`, but can also be reused by other binaries or services.

pub mod calculator;
pub mod config;
pub mod dew_point;
pub mod forecast;
pub mod location;
pub mod model;
pub mod provider;
pub mod query;
pub mod session;

pub use calculator::DewPointCalculator;
pub use config::{Config, DisplayConfig, ForecastConfig, LocationConfig};
pub use dew_point::{DewPointError, compute_dew_point, round_to};
pub use forecast::{ForecastError, ForecastQuery, ForecastVariable, HourlyForecast};
pub use location::{Capability, LocationError, LocationSource};
pub use model::{Coordinates, ForecastRequest, Measurement, Position};
pub use provider::ForecastProvider;
pub use reqwest::Url;
pub use session::{Clock, ForecastReport, ForecastSession, ForecastState, SystemClock};
