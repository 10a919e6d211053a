//! Forecast lookup lifecycle: locate, fetch, hold the result.

use chrono::{DateTime, Utc};
use std::fmt::Debug;
use tracing::{debug, info, warn};

use crate::{
    forecast::{ForecastQuery, HourlyForecast},
    location::{Capability, LocationError, LocationSource},
    model::{ForecastRequest, Position},
    provider::ForecastProvider,
};

/// A successfully fetched forecast and the moment it was requested for.
#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub position: Position,
    pub requested_at: DateTime<Utc>,
    pub forecast: HourlyForecast,
}

impl ForecastReport {
    /// Query for the hour the forecast was requested at.
    pub fn query(&self) -> ForecastQuery {
        ForecastQuery::at(self.requested_at)
    }
}

/// Source of the reference time for a forecast request.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub enum ForecastState {
    NoLocation,
    LocationRequested,
    LocationGranted(Position),
    LocationDenied(String),
    ForecastLoading(Position),
    ForecastReady(Box<ForecastReport>),
    ForecastFailed { position: Position, message: String },
}

impl ForecastState {
    pub fn name(&self) -> &'static str {
        match self {
            ForecastState::NoLocation => "no-location",
            ForecastState::LocationRequested => "location-requested",
            ForecastState::LocationGranted(_) => "location-granted",
            ForecastState::LocationDenied(_) => "location-denied",
            ForecastState::ForecastLoading(_) => "forecast-loading",
            ForecastState::ForecastReady(_) => "forecast-ready",
            ForecastState::ForecastFailed { .. } => "forecast-failed",
        }
    }
}

#[derive(Debug)]
pub struct ForecastSession {
    location: Box<dyn LocationSource>,
    provider: Box<dyn ForecastProvider>,
    clock: Box<dyn Clock>,
    capability: Capability,
    past_days: u8,
    forecast_days: u8,
    state: ForecastState,
}

impl ForecastSession {
    /// The location capability is probed once, here.
    pub fn new(location: Box<dyn LocationSource>, provider: Box<dyn ForecastProvider>) -> Self {
        let capability = location.capability();
        debug!(?capability, "forecast session created");

        Self {
            location,
            provider,
            clock: Box::new(SystemClock),
            capability,
            past_days: 1,
            forecast_days: 3,
            state: ForecastState::NoLocation,
        }
    }

    pub fn with_window(mut self, past_days: u8, forecast_days: u8) -> Self {
        self.past_days = past_days;
        self.forecast_days = forecast_days;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &ForecastState {
        &self.state
    }

    /// `false` when there is no way to obtain a location.
    pub fn can_request(&self) -> bool {
        self.capability == Capability::Available
    }

    pub fn report(&self) -> Option<&ForecastReport> {
        match &self.state {
            ForecastState::ForecastReady(report) => Some(report),
            _ => None,
        }
    }

    /// Locate, then fetch the forecast for the hour the location resolved in.
    ///
    /// Takes `&mut self`, so a second request cannot start while one is in
    /// flight. A previous result is replaced, never merged.
    pub async fn show_forecast(&mut self) -> &ForecastState {
        if !self.can_request() {
            self.transition(ForecastState::LocationDenied(
                LocationError::Unavailable.to_string(),
            ));
            return &self.state;
        }

        self.transition(ForecastState::LocationRequested);
        let position = match self.location.current_position().await {
            Ok(position) => position,
            Err(err) => {
                warn!(%err, "location request failed");
                self.transition(ForecastState::LocationDenied(err.to_string()));
                return &self.state;
            }
        };
        self.transition(ForecastState::LocationGranted(position));
        let requested_at = self.clock.now();

        let request = ForecastRequest {
            coordinates: position.coordinates,
            past_days: self.past_days,
            forecast_days: self.forecast_days,
        };
        self.transition(ForecastState::ForecastLoading(position));

        match self.provider.hourly_forecast(&request).await {
            Ok(forecast) => {
                info!(hours = forecast.len(), timezone = forecast.timezone(), "forecast ready");
                self.transition(ForecastState::ForecastReady(Box::new(ForecastReport {
                    position,
                    requested_at,
                    forecast,
                })));
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(error = %message, "forecast fetch failed");
                self.transition(ForecastState::ForecastFailed { position, message });
            }
        }

        &self.state
    }

    fn transition(&mut self, next: ForecastState) {
        debug!(from = self.state.name(), to = next.name(), "forecast state");
        self.state = next;
    }
}
