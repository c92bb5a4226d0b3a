use serde::{Deserialize, Serialize};
use super::geo::GeoPoint;
use crate::config::constants::{DEFAULT_SCREEN_HEIGHT_PX, DEFAULT_SCREEN_WIDTH_PX};

/// Snapshot of the visible map extent for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRegion {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
    pub center: GeoPoint,
}

impl ViewportRegion {
    pub fn new(center: GeoPoint, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude_delta,
            longitude_delta,
            center,
        }
    }

    /// Clamps both deltas to at least `min_delta`. A zero delta would turn
    /// every pixel threshold into zero, so callers feeding raw camera state
    /// should pass the region through here first.
    pub fn with_minimum_delta(self, min_delta: f64) -> Self {
        let clamp = |delta: f64| if delta.is_finite() && delta >= min_delta { delta } else { min_delta };
        Self {
            latitude_delta: clamp(self.latitude_delta),
            longitude_delta: clamp(self.longitude_delta),
            center: self.center,
        }
    }

    /// Degrees per screen pixel as (latitude, longitude).
    pub fn degrees_per_pixel(&self, screen: ScreenSize) -> (f64, f64) {
        (
            self.latitude_delta / screen.height_px.max(1.0),
            self.longitude_delta / screen.width_px.max(1.0),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width_px: f64,
    pub height_px: f64,
}

impl ScreenSize {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self { width_px, height_px }
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self::new(DEFAULT_SCREEN_WIDTH_PX, DEFAULT_SCREEN_HEIGHT_PX)
    }
}
