use serde::{Deserialize, Serialize};
use crate::config::engine_config::EngineConfig;
use crate::core::clustering::{cluster_by_pixel_distance, Placement};
use crate::core::overlap::resolve_overlaps;
use crate::data::marker_record::Positioned;
use crate::data::viewport::{ScreenSize, ViewportRegion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Merge markers that would overlap on screen.
    Clustered,
    /// Keep every record as its own marker, fanning out co-located ones.
    Spread,
    /// Cluster while zoomed out, spread once zoomed in past the configured delta.
    Auto,
}

impl LayoutMode {
    /// The concrete mode used for `region`. Never returns `Auto`.
    pub fn resolve(self, region: &ViewportRegion, config: &EngineConfig) -> LayoutMode {
        match self {
            LayoutMode::Auto if region.latitude_delta < config.cluster.spread_below_latitude_delta => LayoutMode::Spread,
            LayoutMode::Auto => LayoutMode::Clustered,
            other => other,
        }
    }
}

impl std::str::FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clustered" | "cluster" => Ok(LayoutMode::Clustered),
            "spread" => Ok(LayoutMode::Spread),
            "auto" => Ok(LayoutMode::Auto),
            other => Err(format!("unknown layout mode '{}'", other)),
        }
    }
}

/// Turns records plus the current viewport into renderable placements.
/// The region is clamped to the configured minimum delta first.
pub fn layout_markers<'a, T: Positioned>(
    records: &'a [T],
    region: &ViewportRegion,
    screen: ScreenSize,
    mode: LayoutMode,
    config: &EngineConfig,
) -> Vec<Placement<'a, T>> {
    let region = region.with_minimum_delta(config.cluster.min_viewport_delta);

    match mode.resolve(&region, config) {
        LayoutMode::Spread => resolve_overlaps(records, &config.overlap)
            .into_iter()
            .map(|display| Placement::single(display.record, display.display_position()))
            .collect(),
        _ => cluster_by_pixel_distance(records, &region, screen, &config.cluster),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geo::GeoPoint;
    use crate::data::marker_record::MarkerRecord;

    fn twins() -> Vec<MarkerRecord> {
        vec![
            MarkerRecord::new(1, 56.9496, 24.1052),
            MarkerRecord::new(2, 56.9496, 24.1052),
        ]
    }

    fn region(delta: f64) -> ViewportRegion {
        ViewportRegion::new(GeoPoint::new(56.9496, 24.1052), delta, delta)
    }

    #[test]
    fn spread_keeps_one_placement_per_record() {
        let records = twins();
        let placements = layout_markers(&records, &region(0.1), ScreenSize::default(), LayoutMode::Spread, &EngineConfig::default());
        assert_eq!(placements.len(), 2);
        assert!(placements.iter().all(|p| !p.is_cluster));
        assert_ne!(placements[0].position(), placements[1].position());
    }

    #[test]
    fn clustered_merges_twins() {
        let records = twins();
        let placements = layout_markers(&records, &region(0.1), ScreenSize::default(), LayoutMode::Clustered, &EngineConfig::default());
        assert_eq!(placements.len(), 1);
        assert!(placements[0].is_cluster);
    }

    #[test]
    fn auto_switches_on_zoom() {
        let config = EngineConfig::default();
        assert_eq!(LayoutMode::Auto.resolve(&region(0.2), &config), LayoutMode::Clustered);
        assert_eq!(LayoutMode::Auto.resolve(&region(0.002), &config), LayoutMode::Spread);
        assert_eq!(LayoutMode::Spread.resolve(&region(0.2), &config), LayoutMode::Spread);
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("Cluster".parse::<LayoutMode>(), Ok(LayoutMode::Clustered));
        assert_eq!("spread".parse::<LayoutMode>(), Ok(LayoutMode::Spread));
        assert!("heatmap".parse::<LayoutMode>().is_err());
    }
}
