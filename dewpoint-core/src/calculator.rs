//! Stateful calculator that keeps the last valid measurement and publishes
//! its dew point to subscribers.

use tokio::sync::watch;
use tracing::debug;

use crate::{
    dew_point::{DEFAULT_PRECISION, round_to},
    model::{Measurement, validate_humidity, validate_temperature},
};

#[derive(Debug)]
pub struct DewPointCalculator {
    measurement: Measurement,
    precision: u32,
    dew_point: watch::Sender<f64>,
}

impl DewPointCalculator {
    /// Start from `initial`, falling back to the default measurement if it
    /// cannot be computed.
    pub fn new(initial: Measurement) -> Self {
        let measurement = Measurement::new(initial.temperature, initial.humidity)
            .unwrap_or_else(|err| {
                debug!(%err, "initial measurement rejected, using defaults");
                Measurement::default()
            });
        let dew_point = measurement.dew_point().unwrap_or(f64::NAN);
        let (tx, _) = watch::channel(dew_point);

        Self {
            measurement,
            precision: DEFAULT_PRECISION,
            dew_point: tx,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn measurement(&self) -> Measurement {
        self.measurement
    }

    pub fn dew_point(&self) -> f64 {
        *self.dew_point.borrow()
    }

    pub fn rounded_dew_point(&self) -> f64 {
        round_to(self.dew_point(), self.precision)
    }

    /// Receiver that is marked changed once per settled dew point change.
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.dew_point.subscribe()
    }

    /// Returns `false` and keeps the previous value if `value` is rejected.
    pub fn set_temperature(&mut self, value: f64) -> bool {
        match validate_temperature(value) {
            Ok(temperature) => self.apply(Measurement {
                temperature,
                ..self.measurement
            }),
            Err(err) => {
                debug!(%err, "ignoring temperature update");
                false
            }
        }
    }

    /// Returns `false` and keeps the previous value if `value` is rejected.
    pub fn set_humidity(&mut self, value: f64) -> bool {
        match validate_humidity(value) {
            Ok(humidity) => self.apply(Measurement {
                humidity,
                ..self.measurement
            }),
            Err(err) => {
                debug!(%err, "ignoring humidity update");
                false
            }
        }
    }

    /// Update both inputs at once. Either both are accepted or neither is.
    pub fn set_measurement(&mut self, measurement: Measurement) -> bool {
        match Measurement::new(measurement.temperature, measurement.humidity) {
            Ok(m) => self.apply(m),
            Err(err) => {
                debug!(%err, "ignoring measurement update");
                false
            }
        }
    }

    fn apply(&mut self, measurement: Measurement) -> bool {
        if measurement == self.measurement {
            return true;
        }
        self.measurement = measurement;

        let Ok(next) = measurement.dew_point() else {
            // validated inputs are always computable
            return false;
        };
        self.dew_point.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        true
    }
}

impl Default for DewPointCalculator {
    fn default() -> Self {
        Self::new(Measurement::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_defaults() {
        let calc = DewPointCalculator::default();
        assert_eq!(calc.measurement(), Measurement::default());
        assert_eq!(calc.rounded_dew_point(), 20.6);
    }

    #[test]
    fn invalid_initial_measurement_falls_back() {
        let calc = DewPointCalculator::new(Measurement {
            temperature: 20.0,
            humidity: 0.0,
        });
        assert_eq!(calc.measurement(), Measurement::default());
    }

    #[test]
    fn out_of_range_updates_are_ignored() {
        let mut calc = DewPointCalculator::default();
        let rx = calc.subscribe();

        assert!(!calc.set_temperature(150.0));
        assert!(!calc.set_temperature(-1.0));
        assert!(!calc.set_humidity(0.0));
        assert!(!calc.set_humidity(f64::NAN));
        assert!(!calc.set_measurement(Measurement {
            temperature: 20.0,
            humidity: 120.0,
        }));

        assert_eq!(calc.measurement(), Measurement::default());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn valid_update_recomputes_and_notifies() {
        let mut calc = DewPointCalculator::default();
        let mut rx = calc.subscribe();

        assert!(calc.set_temperature(20.0));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(calc.set_humidity(50.0));
        assert!(rx.has_changed().unwrap());
        assert_eq!(round_to(*rx.borrow_and_update(), 1), 9.3);
        assert_eq!(calc.rounded_dew_point(), 9.3);
    }

    #[test]
    fn batched_update_notifies_once() {
        let mut calc = DewPointCalculator::default();
        let mut rx = calc.subscribe();

        assert!(calc.set_measurement(Measurement {
            temperature: 20.0,
            humidity: 50.0,
        }));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn unchanged_input_does_not_notify() {
        let mut calc = DewPointCalculator::default();
        let rx = calc.subscribe();

        assert!(calc.set_temperature(28.0));
        assert!(calc.set_measurement(Measurement::default()));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn precision_controls_rounding() {
        let calc = DewPointCalculator::new(Measurement {
            temperature: 20.0,
            humidity: 50.0,
        })
        .with_precision(2);
        assert_eq!(calc.rounded_dew_point(), 9.26);
    }
}
