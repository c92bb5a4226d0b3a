use serde::{Deserialize, Serialize};
use crate::config::constants::EARTH_RADIUS_KM;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Manhattan distance in raw degrees. Only meant for cheap "has it moved" checks.
    pub fn l1_degrees(&self, other: &GeoPoint) -> f64 {
        (self.latitude - other.latitude).abs() + (self.longitude - other.longitude).abs()
    }
}

/// Great-circle distance in kilometres. NaN inputs propagate.
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_latitude &&
        point.latitude <= self.max_latitude &&
        point.longitude >= self.min_longitude &&
        point.longitude <= self.max_longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        assert_eq!(distance_km(56.9496, 24.1052, 56.9496, 24.1052), 0.0);
    }

    #[test]
    fn riga_to_jurmala_is_about_twenty_kilometres() {
        let riga = GeoPoint::new(56.9496, 24.1052);
        let jurmala = GeoPoint::new(56.9680, 23.7704);
        let d = riga.distance_km(&jurmala);
        assert!(d > 19.0 && d < 22.0, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn nan_propagates() {
        assert!(distance_km(f64::NAN, 24.0, 56.0, 24.0).is_nan());
    }

    #[test]
    fn bounding_box_edges_are_inclusive() {
        let bbox = BoundingBox {
            min_latitude: 55.0,
            max_latitude: 58.0,
            min_longitude: 21.0,
            max_longitude: 28.0,
        };
        assert!(bbox.contains(&GeoPoint::new(55.0, 28.0)));
        assert!(!bbox.contains(&GeoPoint::new(40.7, -74.0)));
        assert!(!bbox.contains(&GeoPoint::new(f64::NAN, 24.0)));
    }
}
