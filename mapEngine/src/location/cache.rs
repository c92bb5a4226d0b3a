use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::config::constants::LOCATION_CLOCK_SKEW_MINUTES;
use crate::config::engine_config::LocationConfig;
use crate::data::geo::GeoPoint;
use crate::location::store::KeyValueStore;
use crate::utils::logging::{self, OperationCategory, LocationType};

/// Stored form of the last known location. `timestamp` is Unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedLocation {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: i64,
}

impl CachedLocation {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Missing,
    Malformed,
    Stale,
    OutOfRegion,
}

/// Best-effort persistence of the last device location. Storage failures
/// never reach the caller; they only degrade to "no cached location".
pub struct LocationCache<S: KeyValueStore> {
    store: S,
    config: LocationConfig,
}

impl<S: KeyValueStore> LocationCache<S> {
    pub fn new(store: S, config: LocationConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn config(&self) -> &LocationConfig {
        &self.config
    }

    pub fn read(&mut self) -> Option<GeoPoint> {
        self.read_at(Utc::now())
    }

    /// Returns the cached point if it is fresh and inside the service region.
    /// Anything else is evicted so the next read starts clean.
    pub fn read_at(&mut self, now: DateTime<Utc>) -> Option<GeoPoint> {
        let _timing = logging::start_timing("LocationCache::read",
            OperationCategory::Location { subcategory: LocationType::CacheRead });

        match self.validate(now) {
            Ok(point) => Some(point),
            Err(Rejection::Missing) => None,
            Err(reason) => {
                debug!(?reason, "evicting cached location");
                if let Err(e) = self.store.remove(&self.config.storage_key) {
                    warn!(error = %e, "failed to evict cached location");
                }
                None
            }
        }
    }

    fn validate(&self, now: DateTime<Utc>) -> Result<GeoPoint, Rejection> {
        let raw = match self.store.get(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(Rejection::Missing),
            Err(e) => {
                warn!(error = %e, "location cache unreadable");
                return Err(Rejection::Missing);
            }
        };

        let entry: CachedLocation = serde_json::from_str(&raw).map_err(|_| Rejection::Malformed)?;
        let point = entry.point();
        if !point.is_finite() {
            return Err(Rejection::Malformed);
        }

        let stored_at = DateTime::<Utc>::from_timestamp_millis(entry.timestamp).ok_or(Rejection::Malformed)?;
        if stored_at - now > Duration::minutes(LOCATION_CLOCK_SKEW_MINUTES) {
            return Err(Rejection::Malformed);
        }
        // An age too large for a Duration means no upper bound
        if let Some(max_age) = Duration::try_hours(self.config.max_age_hours) {
            if now - stored_at > max_age {
                return Err(Rejection::Stale);
            }
        }

        if !self.config.service_region.contains(&point) {
            return Err(Rejection::OutOfRegion);
        }

        Ok(point)
    }

    pub fn write(&mut self, point: GeoPoint) {
        self.write_at(point, Utc::now())
    }

    /// Overwrites the stored entry. Failures are logged and swallowed.
    pub fn write_at(&mut self, point: GeoPoint, now: DateTime<Utc>) {
        let _timing = logging::start_timing("LocationCache::write",
            OperationCategory::Location { subcategory: LocationType::CacheWrite });

        let entry = CachedLocation {
            lat: point.latitude,
            lng: point.longitude,
            timestamp: now.timestamp_millis(),
        };

        let result = serde_json::to_string(&entry)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.store
                    .set(&self.config.storage_key, &json)
                    .map_err(|e| e.to_string())
            });

        if let Err(e) = result {
            warn!(error = %e, "failed to cache location");
        }
    }
}
