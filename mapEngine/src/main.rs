use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{info, warn};

use marker_engine::cli::cli::Args;
use marker_engine::config::engine_config::EngineConfig;
use marker_engine::core::clustering::Placement;
use marker_engine::core::layout::{layout_markers, LayoutMode};
use marker_engine::data::geo::GeoPoint;
use marker_engine::data::marker_record::MarkerRecord;
use marker_engine::data::records_loader;
use marker_engine::data::viewport::{ScreenSize, ViewportRegion};
use marker_engine::location::cache::LocationCache;
use marker_engine::location::sensor::{FixedSensor, LocationSensor, UnavailableSensor};
use marker_engine::location::store::FileStore;
use marker_engine::location::tracker::{LocationListener, LocationTracker, SeedSource};
use marker_engine::render::icon::IconDescriptor;
use marker_engine::render::icon_cache::MarkerIconCache;
use marker_engine::utils::logging::{self, OperationCategory, FileIOType};

const CATEGORIES: [&str; 6] = ["cleaning", "moving", "repair", "tutoring", "delivery", "gardening"];

struct LogListener;

impl LocationListener for LogListener {
    fn on_seed(&mut self, seed: GeoPoint, source: SeedSource) {
        info!(?source, lat = seed.latitude, lng = seed.longitude, "initial map location");
    }

    fn on_moved(&mut self, location: GeoPoint) {
        info!(lat = location.latitude, lng = location.longitude, "location changed, layout uses fresh fix");
    }
}

#[derive(Serialize)]
struct RenderedMarker<'a> {
    #[serde(flatten)]
    placement: Placement<'a, MarkerRecord>,
    icon: IconDescriptor,
}

#[derive(Serialize)]
struct LayoutOutput<'a> {
    location: GeoPoint,
    region: ViewportRegion,
    mode: LayoutMode,
    markers: Vec<RenderedMarker<'a>>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing(), args.debug_logging());

    let config = match args.config() {
        Some(path) => {
            let _timing = logging::start_timing("load_config",
                OperationCategory::FileIO { subcategory: FileIOType::ConfigLoad });
            EngineConfig::load(path).with_context(|| format!("loading config {}", path))?
        }
        None => EngineConfig::default(),
    };

    // Location: cache in the state dir, then one simulated sensor read
    let cache = LocationCache::new(FileStore::new(args.state_dir()), config.location.clone());
    let mut listener = LogListener;
    let mut tracker = LocationTracker::initialize(cache, &mut listener);

    let mut sensor: Box<dyn LocationSensor> = match args.gps() {
        Some(point) => Box::new(FixedSensor(point)),
        None => Box::new(UnavailableSensor),
    };
    let phase = tracker.acquire(sensor.as_mut(), &mut listener);
    info!(?phase, "location acquisition finished");

    let center = args.center().unwrap_or_else(|| tracker.location());
    let records = load_or_generate(&args, center)?;

    let region = ViewportRegion::new(center, args.lat_delta(), args.lng_delta());
    let screen = ScreenSize::new(args.screen_width(), args.screen_height());
    let mode = args.mode().resolve(&region, &config);

    let placements = layout_markers(&records, &region, screen, mode, &config);
    info!(records = records.len(), placements = placements.len(), ?mode, "layout complete");

    let mut icons = MarkerIconCache::new(config.icons.clone());
    let markers = placements
        .into_iter()
        .map(|placement| {
            let icon = if placement.is_cluster {
                icons.get_cluster_icon(placement.len())
            } else {
                let record = placement.members[0];
                icons.get_marker_icon(record.budget, args.selected() == Some(record.id), record.is_urgent)
            };
            RenderedMarker { placement, icon: (*icon).clone() }
        })
        .collect();

    let stats = icons.stats();
    info!(hits = stats.hits, misses = stats.misses, "icon cache");

    let output = LayoutOutput {
        location: tracker.location(),
        region,
        mode,
        markers,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    logging::print_timing_report();
    Ok(())
}

fn load_or_generate(args: &Args, center: GeoPoint) -> Result<Vec<MarkerRecord>> {
    match (args.records(), args.random()) {
        (Some(path), _) => records_loader::load_records(path)
            .with_context(|| format!("loading records from {}", path)),
        (None, Some(count)) => Ok(generate_records(count, center, args.lat_delta(), args.lng_delta(), args.seed())),
        (None, None) => bail!("either --records or --random is required"),
    }
}

// Scatter records over the viewport, with a few exact duplicates so overlap handling shows up
fn generate_records(count: usize, center: GeoPoint, lat_delta: f64, lng_delta: f64, seed: Option<u64>) -> Vec<MarkerRecord> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut records: Vec<MarkerRecord> = Vec::with_capacity(count);
    for id in 0..count as i64 {
        let record = if id > 0 && rng.gen_bool(0.1) {
            let twin = &records[rng.gen_range(0..records.len())];
            MarkerRecord { id, ..twin.clone() }
        } else {
            let lat = center.latitude + rng.gen_range(-0.5..0.5) * lat_delta;
            let lng = center.longitude + rng.gen_range(-0.5..0.5) * lng_delta;
            let mut record = MarkerRecord::new(id, lat, lng)
                .with_budget(rng.gen_range(5.0..150.0f64).round())
                .with_category(CATEGORIES[rng.gen_range(0..CATEGORIES.len())]);
            if rng.gen_bool(0.15) {
                record = record.urgent();
            }
            record
        };
        records.push(record);
    }

    if records.is_empty() {
        warn!("generated an empty record set");
    }
    records
}
