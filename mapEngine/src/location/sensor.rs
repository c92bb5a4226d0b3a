use std::time::Duration;
use crate::data::geo::GeoPoint;

/// Result of one "get current position" request.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorOutcome {
    Fix(GeoPoint),
    Denied,
    TimedOut,
    Unavailable(String),
}

/// Device geolocation. Implementations must give up after `timeout`.
pub trait LocationSensor {
    fn current_position(&mut self, timeout: Duration) -> SensorOutcome;
}

/// Always reports the same fix. Used for `--gps` on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedSensor(pub GeoPoint);

impl LocationSensor for FixedSensor {
    fn current_position(&mut self, _timeout: Duration) -> SensorOutcome {
        SensorOutcome::Fix(self.0)
    }
}

/// A device without positioning hardware or with permission denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSensor;

impl LocationSensor for UnavailableSensor {
    fn current_position(&mut self, _timeout: Duration) -> SensorOutcome {
        SensorOutcome::Denied
    }
}
