//! "Best known location now" for the map.
//!
//! A tracker starts from a seed (cached location, else the service-region
//! default) so the map can render immediately, then makes at most one
//! sensor request. A successful fix is cached and only reported to the
//! consumer as a move when it is far enough from the seed to matter.

use std::time::Duration;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use crate::data::geo::GeoPoint;
use crate::location::cache::LocationCache;
use crate::location::sensor::{LocationSensor, SensorOutcome};
use crate::location::store::KeyValueStore;
use crate::utils::logging::{self, OperationCategory, LocationType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    Cached,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Sensor produced a fix; `moved` is true when it passed the movement threshold.
    Located { moved: bool },
    Denied,
    TimedOut,
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionPhase {
    Idle,
    Requesting,
    Done(Resolution),
}

/// Consumer callbacks.
pub trait LocationListener {
    /// Called once, synchronously, from `initialize` with the seed location.
    fn on_seed(&mut self, seed: GeoPoint, source: SeedSource);

    /// Called when a sensor fix moved meaningfully away from the seed, so
    /// location-dependent fetches should be re-run.
    fn on_moved(&mut self, location: GeoPoint);
}

pub struct LocationTracker<S: KeyValueStore> {
    cache: LocationCache<S>,
    seed: GeoPoint,
    seed_source: SeedSource,
    location: GeoPoint,
    phase: AcquisitionPhase,
    recenter_signal: u64,
}

impl<S: KeyValueStore> LocationTracker<S> {
    pub fn initialize<L: LocationListener>(cache: LocationCache<S>, listener: &mut L) -> Self {
        Self::initialize_at(cache, Utc::now(), listener)
    }

    pub fn initialize_at<L: LocationListener>(
        mut cache: LocationCache<S>,
        now: DateTime<Utc>,
        listener: &mut L,
    ) -> Self {
        let (seed, seed_source) = match cache.read_at(now) {
            Some(point) => (point, SeedSource::Cached),
            None => (cache.config().default_location, SeedSource::Default),
        };

        debug!(?seed_source, lat = seed.latitude, lng = seed.longitude, "seeded location");
        listener.on_seed(seed, seed_source);

        Self {
            cache,
            seed,
            seed_source,
            location: seed,
            phase: AcquisitionPhase::Idle,
            recenter_signal: 0,
        }
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    pub fn seed(&self) -> GeoPoint {
        self.seed
    }

    pub fn seed_source(&self) -> SeedSource {
        self.seed_source
    }

    pub fn phase(&self) -> &AcquisitionPhase {
        &self.phase
    }

    pub fn recenter_signal(&self) -> u64 {
        self.recenter_signal
    }

    pub fn cache(&self) -> &LocationCache<S> {
        &self.cache
    }

    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(self.cache.config().sensor_timeout_ms)
    }

    /// Moves `Idle` to `Requesting`. Returns false if a request was already
    /// made during this tracker's lifetime.
    pub fn begin_request(&mut self) -> bool {
        if self.phase != AcquisitionPhase::Idle {
            debug!(phase = ?self.phase, "location request already attempted");
            return false;
        }
        self.phase = AcquisitionPhase::Requesting;
        true
    }

    /// Applies the sensor outcome. Outcomes that arrive when no request is
    /// in flight (late callbacks after a timeout) are ignored. Returns true
    /// when the listener was told to refresh.
    pub fn complete_request<L: LocationListener>(&mut self, outcome: SensorOutcome, listener: &mut L) -> bool {
        if self.phase != AcquisitionPhase::Requesting {
            debug!(?outcome, phase = ?self.phase, "ignoring location outcome with no request in flight");
            return false;
        }

        let resolution = match outcome {
            SensorOutcome::Fix(point) if point.is_finite() => {
                self.location = point;
                self.cache.write(point);

                let moved = point.l1_degrees(&self.seed) > self.cache.config().movement_threshold_degrees;
                if moved {
                    info!(lat = point.latitude, lng = point.longitude, "location moved, requesting refresh");
                    listener.on_moved(point);
                }
                Resolution::Located { moved }
            }
            SensorOutcome::Fix(point) => {
                Resolution::Unavailable(format!("non-finite fix ({}, {})", point.latitude, point.longitude))
            }
            SensorOutcome::Denied => Resolution::Denied,
            SensorOutcome::TimedOut => Resolution::TimedOut,
            SensorOutcome::Unavailable(reason) => Resolution::Unavailable(reason),
        };

        if !matches!(resolution, Resolution::Located { .. }) {
            debug!(?resolution, "keeping seed location");
        }

        let moved = matches!(resolution, Resolution::Located { moved: true });
        self.phase = AcquisitionPhase::Done(resolution);
        moved
    }

    /// Runs the single sensor request, if not attempted yet.
    pub fn acquire<L: LocationListener>(&mut self, sensor: &mut dyn LocationSensor, listener: &mut L) -> &AcquisitionPhase {
        let _timing = logging::start_timing("LocationTracker::acquire",
            OperationCategory::Location { subcategory: LocationType::Acquisition });

        if self.begin_request() {
            let outcome = sensor.current_position(self.sensor_timeout());
            self.complete_request(outcome, listener);
        }
        &self.phase
    }

    /// Asks the map to animate back to the current location. Does not
    /// trigger a new acquisition.
    pub fn recenter(&mut self) -> u64 {
        self.recenter_signal += 1;
        self.recenter_signal
    }
}
