use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::config::constants::*;
use crate::data::geo::{BoundingBox, GeoPoint};
use crate::errors::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapConfig {
    pub precision_decimals: i32,
    pub golden_angle_degrees: f64,
    pub spiral_radius_degrees: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub cluster_radius_px: f64,
    pub min_viewport_delta: f64,
    pub spread_below_latitude_delta: f64, // Auto layout switches to spreading below this
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub budget_tier_max: f64,
    pub standard_tier_max: f64,
    pub cache_capacity: usize,  // Per selection state
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub storage_key: String,
    pub max_age_hours: i64,
    pub sensor_timeout_ms: u64,
    pub movement_threshold_degrees: f64,
    pub default_location: GeoPoint,
    pub service_region: BoundingBox,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub overlap: OverlapConfig,
    pub cluster: ClusterConfig,
    pub icons: IconConfig,
    pub location: LocationConfig,
}

impl EngineConfig {
    /// Reads a JSON config file. Sections or fields left out keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(content)?)
    }
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            precision_decimals: BUCKET_PRECISION_DECIMALS,
            golden_angle_degrees: GOLDEN_ANGLE_DEGREES,
            spiral_radius_degrees: SPIRAL_RADIUS_DEGREES,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cluster_radius_px: CLUSTER_RADIUS_PX,
            min_viewport_delta: MIN_VIEWPORT_DELTA,
            spread_below_latitude_delta: SPREAD_BELOW_LATITUDE_DELTA,
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            budget_tier_max: BUDGET_TIER_MAX,
            standard_tier_max: STANDARD_TIER_MAX,
            cache_capacity: ICON_CACHE_CAPACITY,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            storage_key: LOCATION_STORAGE_KEY.to_string(),
            max_age_hours: LOCATION_MAX_AGE_HOURS,
            sensor_timeout_ms: SENSOR_TIMEOUT_MS,
            movement_threshold_degrees: MOVEMENT_THRESHOLD_DEGREES,
            default_location: GeoPoint::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE),
            service_region: BoundingBox {
                min_latitude: SERVICE_REGION_MIN_LAT,
                max_latitude: SERVICE_REGION_MAX_LAT,
                min_longitude: SERVICE_REGION_MIN_LNG,
                max_longitude: SERVICE_REGION_MAX_LNG,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"cluster": {"cluster_radius_px": 80.0}}"#).unwrap();
        assert_eq!(config.cluster.cluster_radius_px, 80.0);
        assert_eq!(config.cluster.min_viewport_delta, MIN_VIEWPORT_DELTA);
        assert_eq!(config.location.storage_key, LOCATION_STORAGE_KEY);
        assert_eq!(config.icons.cache_capacity, ICON_CACHE_CAPACITY);
    }

    #[test]
    fn default_location_is_inside_service_region() {
        let location = LocationConfig::default();
        assert!(location.service_region.contains(&location.default_location));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EngineConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
