// Module declarations for the marker placement engine

// Placement algorithms
pub mod core {
    pub mod overlap;
    pub mod clustering;
    pub mod layout;
}

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod engine_config;
}

// Input data shapes and loaders
pub mod data {
    pub mod geo;
    pub mod marker_record;
    pub mod viewport;
    pub mod records_loader;
}

// Marker glyphs
pub mod render {
    pub mod icon;
    pub mod icon_cache;
}

// Device location acquisition and caching
pub mod location {
    pub mod store;
    pub mod cache;
    pub mod sensor;
    pub mod tracker;
}

// Utility functions
pub mod utils {
    pub mod logging;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

pub mod errors;

// Re-export commonly used items
pub use crate::core::clustering::{cluster_by_pixel_distance, Placement};
pub use crate::core::overlap::{resolve_overlaps, DisplayRecord};
pub use crate::core::layout::{layout_markers, LayoutMode};
pub use crate::config::engine_config::EngineConfig;
pub use crate::data::geo::{distance_km, GeoPoint};
pub use crate::data::marker_record::{MarkerRecord, Positioned};
pub use crate::data::viewport::{ScreenSize, ViewportRegion};
pub use crate::render::icon_cache::MarkerIconCache;
pub use crate::location::tracker::LocationTracker;
pub use crate::errors::EngineError;
