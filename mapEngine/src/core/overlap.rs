//! Spreads records that share (nearly) the same coordinate along a
//! golden-angle spiral so each one stays individually clickable.
//!
//! Unlike clustering this never merges records: output is 1:1 with every
//! placeable input record, in input order.

use std::collections::HashMap;
use serde::Serialize;
use tracing::debug;
use crate::config::engine_config::OverlapConfig;
use crate::data::geo::GeoPoint;
use crate::data::marker_record::{MarkerRecord, Positioned};
use crate::utils::logging::{self, OperationCategory, LayoutType};

/// A record paired with the coordinate it should be drawn at.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayRecord<'a, T = MarkerRecord> {
    pub record: &'a T,
    pub position: GeoPoint,
    pub display_latitude: f64,
    pub display_longitude: f64,
    /// 0 for the record that keeps its true coordinate.
    pub spiral_index: usize,
}

impl<'a, T> DisplayRecord<'a, T> {
    pub fn display_position(&self) -> GeoPoint {
        GeoPoint::new(self.display_latitude, self.display_longitude)
    }

    pub fn is_offset(&self) -> bool {
        self.spiral_index > 0
    }
}

/// Coordinate rounded to `precision_decimals`, as integer units so it can be hashed.
pub fn bucket_key(point: &GeoPoint, precision_decimals: i32) -> (i64, i64) {
    let scale = 10f64.powi(precision_decimals);
    (
        (point.latitude * scale).round() as i64,
        (point.longitude * scale).round() as i64,
    )
}

/// Offset in degrees (latitude, longitude) for the `index`-th extra member of a bucket.
/// Index 0 is the anchor and gets no offset.
pub fn spiral_offset(index: usize, config: &OverlapConfig) -> (f64, f64) {
    if index == 0 {
        return (0.0, 0.0);
    }
    let step = index as f64;
    let angle = (step * config.golden_angle_degrees).to_radians();
    let radius = config.spiral_radius_degrees * step.sqrt();
    (radius * angle.sin(), radius * angle.cos())
}

pub fn resolve_overlaps<'a, T: Positioned>(
    records: &'a [T],
    config: &OverlapConfig,
) -> Vec<DisplayRecord<'a, T>> {
    let _timing = logging::start_timing("resolve_overlaps",
        OperationCategory::Layout { subcategory: LayoutType::OverlapResolution });

    let mut seen_per_bucket: HashMap<(i64, i64), usize> = HashMap::new();
    let mut resolved = Vec::with_capacity(records.len());
    let mut offset_count = 0usize;

    for record in records {
        let Some(position) = record.position() else {
            continue;
        };

        let slot = seen_per_bucket
            .entry(bucket_key(&position, config.precision_decimals))
            .or_insert(0);
        let spiral_index = *slot;
        *slot += 1;

        let (d_lat, d_lng) = spiral_offset(spiral_index, config);
        if spiral_index > 0 {
            offset_count += 1;
        }

        resolved.push(DisplayRecord {
            record,
            position,
            display_latitude: position.latitude + d_lat,
            display_longitude: position.longitude + d_lng,
            spiral_index,
        });
    }

    debug!(
        input = records.len(),
        placed = resolved.len(),
        offset = offset_count,
        "resolved marker overlaps"
    );

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OverlapConfig {
        OverlapConfig::default()
    }

    #[test]
    fn singletons_keep_their_coordinate() {
        let records = vec![
            MarkerRecord::new(1, 56.9496, 24.1052),
            MarkerRecord::new(2, 56.9600, 24.1200),
        ];
        let resolved = resolve_overlaps(&records, &config());
        assert_eq!(resolved.len(), 2);
        for r in &resolved {
            assert_eq!(r.display_position(), r.position);
            assert!(!r.is_offset());
        }
    }

    #[test]
    fn two_identical_points_are_separated() {
        let records = vec![
            MarkerRecord::new(1, 56.9496, 24.1052),
            MarkerRecord::new(2, 56.9496, 24.1052),
        ];
        let resolved = resolve_overlaps(&records, &config());

        assert_eq!(resolved[0].record.id, 1);
        assert_eq!(resolved[0].display_latitude, 56.9496);
        assert_eq!(resolved[0].display_longitude, 24.1052);

        let (d_lat, d_lng) = spiral_offset(1, &config());
        assert!(d_lat != 0.0 || d_lng != 0.0);
        assert_eq!(resolved[1].display_latitude, 56.9496 + d_lat);
        assert_eq!(resolved[1].display_longitude, 24.1052 + d_lng);
        assert_ne!(resolved[0].display_position(), resolved[1].display_position());
    }

    #[test]
    fn nearby_points_share_a_bucket() {
        // 0.00001° apart, well under the 4-decimal bucket size
        let records = vec![
            MarkerRecord::new(1, 56.94960, 24.10520),
            MarkerRecord::new(2, 56.94961, 24.10521),
        ];
        let resolved = resolve_overlaps(&records, &config());
        assert_eq!(resolved[1].spiral_index, 1);
    }

    #[test]
    fn spiral_radius_grows_with_sqrt_of_index() {
        let cfg = config();
        let radius = |i| {
            let (a, b) = spiral_offset(i, &cfg);
            (a * a + b * b).sqrt()
        };
        assert!((radius(4) / radius(1) - 2.0).abs() < 1e-9);
        assert!((radius(1) - cfg.spiral_radius_degrees).abs() < 1e-12);
    }

    #[test]
    fn large_bucket_has_no_duplicate_display_coordinates() {
        let records: Vec<_> = (0..50).map(|i| MarkerRecord::new(i, 56.9496, 24.1052)).collect();
        let resolved = resolve_overlaps(&records, &config());
        for (i, a) in resolved.iter().enumerate() {
            for b in &resolved[i + 1..] {
                assert_ne!(a.display_position(), b.display_position());
            }
        }
    }

    #[test]
    fn records_without_coordinates_are_skipped() {
        let mut missing = MarkerRecord::new(2, 0.0, 0.0);
        missing.latitude = None;
        let records = vec![MarkerRecord::new(1, 56.9, 24.1), missing];
        let resolved = resolve_overlaps(&records, &config());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].record.id, 1);
    }
}
