//! Screen-space clustering. Records whose markers would be drawn within a
//! fixed pixel radius of each other collapse into one cluster marker, so
//! cluster membership adapts to zoom rather than to geographic distance.

use serde::Serialize;
use tracing::debug;
use crate::config::engine_config::ClusterConfig;
use crate::data::geo::GeoPoint;
use crate::data::marker_record::{MarkerRecord, Positioned};
use crate::data::viewport::{ScreenSize, ViewportRegion};
use crate::utils::logging::{self, OperationCategory, LayoutType};

/// One renderable marker: either a single record or a cluster of them.
#[derive(Debug, Clone, Serialize)]
pub struct Placement<'a, T = MarkerRecord> {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub members: Vec<&'a T>,
    pub is_cluster: bool,
}

impl<'a, T: Positioned> Placement<'a, T> {
    pub fn single(record: &'a T, at: GeoPoint) -> Self {
        Self {
            id: record.marker_key(),
            latitude: at.latitude,
            longitude: at.longitude,
            members: vec![record],
            is_cluster: false,
        }
    }

    /// Cluster positioned at `centroid`. The id only depends on the centroid
    /// and member count, so unchanged input keeps a stable id across passes.
    pub fn cluster(members: Vec<&'a T>, centroid: GeoPoint) -> Self {
        Self {
            id: format!("cluster-{:.6}-{:.6}-{}", centroid.latitude, centroid.longitude, members.len()),
            latitude: centroid.latitude,
            longitude: centroid.longitude,
            members,
            is_cluster: true,
        }
    }
}

impl<'a, T> Placement<'a, T> {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Cluster radius converted to degrees as (latitude, longitude).
/// Non-positive or NaN deltas give a zero threshold.
pub fn pixel_threshold_degrees(
    region: &ViewportRegion,
    screen: ScreenSize,
    config: &ClusterConfig,
) -> (f64, f64) {
    let (lat_per_px, lng_per_px) = region.degrees_per_pixel(screen);
    let guard = |v: f64| if v > 0.0 { v * config.cluster_radius_px } else { 0.0 };
    (guard(lat_per_px), guard(lng_per_px))
}

/// Greedy single pass over `records` in input order. Each placeable record
/// joins exactly one group; records without a position are dropped.
///
/// Proximity is an axis-aligned box (independent latitude and longitude
/// thresholds), not a circle.
pub fn cluster_by_pixel_distance<'a, T: Positioned>(
    records: &'a [T],
    region: &ViewportRegion,
    screen: ScreenSize,
    config: &ClusterConfig,
) -> Vec<Placement<'a, T>> {
    let _timing = logging::start_timing("cluster_by_pixel_distance",
        OperationCategory::Layout { subcategory: LayoutType::Clustering });

    let (lat_threshold, lng_threshold) = pixel_threshold_degrees(region, screen, config);

    let points: Vec<(&'a T, GeoPoint)> = records
        .iter()
        .filter_map(|record| record.position().map(|p| (record, p)))
        .collect();

    let mut processed = vec![false; points.len()];
    let mut placements = Vec::new();

    for i in 0..points.len() {
        if processed[i] {
            continue;
        }
        processed[i] = true;

        let (anchor_record, anchor) = points[i];
        let mut group = vec![(anchor_record, anchor)];

        for j in (i + 1)..points.len() {
            if processed[j] {
                continue;
            }
            let (record, point) = points[j];
            if (point.latitude - anchor.latitude).abs() <= lat_threshold
                && (point.longitude - anchor.longitude).abs() <= lng_threshold
            {
                processed[j] = true;
                group.push((record, point));
            }
        }

        if group.len() == 1 {
            placements.push(Placement::single(anchor_record, anchor));
        } else {
            let n = group.len() as f64;
            let centroid = GeoPoint::new(
                group.iter().map(|(_, p)| p.latitude).sum::<f64>() / n,
                group.iter().map(|(_, p)| p.longitude).sum::<f64>() / n,
            );
            let members = group.into_iter().map(|(record, _)| record).collect();
            placements.push(Placement::cluster(members, centroid));
        }
    }

    debug!(
        input = records.len(),
        placeable = points.len(),
        placements = placements.len(),
        clusters = placements.iter().filter(|p| p.is_cluster).count(),
        lat_threshold,
        lng_threshold,
        "clustered markers"
    );

    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn riga() -> GeoPoint {
        GeoPoint::new(56.9496, 24.1052)
    }

    fn region(delta: f64) -> ViewportRegion {
        ViewportRegion::new(riga(), delta, delta)
    }

    fn screen() -> ScreenSize {
        ScreenSize::new(400.0, 800.0)
    }

    #[test]
    fn threshold_scales_with_delta() {
        let cfg = ClusterConfig::default();
        let (lat, lng) = pixel_threshold_degrees(&region(0.1), screen(), &cfg);
        assert!((lat - 0.1 / 800.0 * 60.0).abs() < 1e-12);
        assert!((lng - 0.1 / 400.0 * 60.0).abs() < 1e-12);

        let (lat_in, _) = pixel_threshold_degrees(&region(0.01), screen(), &cfg);
        assert!(lat_in < lat);
    }

    #[test]
    fn distant_records_stay_single() {
        // Roughly 10 km apart in each direction
        let records: Vec<_> = (0..5)
            .map(|i| MarkerRecord::new(i, 56.9 + i as f64 * 0.09, 24.1 + i as f64 * 0.15))
            .collect();
        let placements = cluster_by_pixel_distance(&records, &region(0.1), screen(), &ClusterConfig::default());
        assert_eq!(placements.len(), 5);
        assert!(placements.iter().all(|p| !p.is_cluster && p.len() == 1));
        assert_eq!(placements[2].id, "2");
        assert_eq!(placements[2].latitude, records[2].latitude.unwrap());
    }

    #[test]
    fn close_records_merge_at_centroid() {
        let records = vec![
            MarkerRecord::new(1, 56.9500, 24.1000),
            MarkerRecord::new(2, 56.9502, 24.1004),
            MarkerRecord::new(3, 57.5000, 25.0000),
        ];
        let placements = cluster_by_pixel_distance(&records, &region(0.1), screen(), &ClusterConfig::default());
        assert_eq!(placements.len(), 2);

        let cluster = &placements[0];
        assert!(cluster.is_cluster);
        assert_eq!(cluster.members.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!((cluster.latitude - 56.9501).abs() < 1e-9);
        assert!((cluster.longitude - 24.1002).abs() < 1e-9);
        assert!(cluster.id.starts_with("cluster-"));
        assert!(cluster.id.ends_with("-2"));

        assert!(!placements[1].is_cluster);
    }

    #[test]
    fn records_without_coordinates_are_not_counted() {
        let mut broken = MarkerRecord::new(2, 56.9500, 24.1000);
        broken.latitude = None;
        let records = vec![MarkerRecord::new(1, 56.9500, 24.1000), broken];
        let placements = cluster_by_pixel_distance(&records, &region(0.1), screen(), &ClusterConfig::default());
        assert_eq!(placements.len(), 1);
        assert!(!placements[0].is_cluster);
    }

    #[test]
    fn axis_box_not_circle() {
        // Inside the box corner but outside the inscribed circle
        let cfg = ClusterConfig::default();
        let (lat_t, lng_t) = pixel_threshold_degrees(&region(0.1), screen(), &cfg);
        let records = vec![
            MarkerRecord::new(1, 56.9, 24.1),
            MarkerRecord::new(2, 56.9 + lat_t * 0.95, 24.1 + lng_t * 0.95),
        ];
        let placements = cluster_by_pixel_distance(&records, &region(0.1), screen(), &cfg);
        assert_eq!(placements.len(), 1);
        assert!(placements[0].is_cluster);
    }

    #[test]
    fn zero_delta_only_merges_exact_duplicates() {
        let records = vec![
            MarkerRecord::new(1, 56.9496, 24.1052),
            MarkerRecord::new(2, 56.9496, 24.1052),
            MarkerRecord::new(3, 56.94961, 24.1052),
        ];
        let placements = cluster_by_pixel_distance(&records, &region(0.0), screen(), &ClusterConfig::default());
        assert_eq!(placements.len(), 2);
        assert!(placements[0].is_cluster);
        assert!(placements.iter().all(|p| p.latitude.is_finite() && p.longitude.is_finite()));
    }

    #[test]
    fn nan_delta_keeps_everything_single() {
        let records = vec![
            MarkerRecord::new(1, 56.9496, 24.1052),
            MarkerRecord::new(2, 56.9497, 24.1053),
        ];
        let region = ViewportRegion::new(riga(), f64::NAN, f64::NAN);
        let placements = cluster_by_pixel_distance(&records, &region, screen(), &ClusterConfig::default());
        assert_eq!(placements.len(), 2);
    }

    #[test]
    fn greedy_grouping_follows_input_order() {
        // A-B and B-C overlap, A-C do not: A claims B, C stays alone
        let cfg = ClusterConfig::default();
        let (lat_t, _) = pixel_threshold_degrees(&region(0.1), screen(), &cfg);
        let records = vec![
            MarkerRecord::new(1, 56.9, 24.1),
            MarkerRecord::new(2, 56.9 + lat_t * 0.8, 24.1),
            MarkerRecord::new(3, 56.9 + lat_t * 1.6, 24.1),
        ];
        let placements = cluster_by_pixel_distance(&records, &region(0.1), screen(), &cfg);
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].len(), 2);
        assert_eq!(placements[1].members[0].id, 3);
    }
}
