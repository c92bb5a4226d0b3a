use clap::Parser;
use crate::core::layout::LayoutMode;
use crate::data::geo::GeoPoint;

fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'lat,lng', got '{}'", s))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude '{}'", lat))?;
    let lng: f64 = lng.trim().parse().map_err(|_| format!("invalid longitude '{}'", lng))?;
    Ok(GeoPoint::new(lat, lng))
}

#[derive(Parser)]
#[command(author, version, about = "Lay out marketplace map markers for a viewport", long_about = None)]
pub struct Args {
    #[arg(short, long, help = "CSV or JSON file with marker records")]
    records: Option<String>,

    #[arg(long, help = "Generate this many random records around the map centre instead of loading a file")]
    random: Option<usize>,

    #[arg(long, help = "Random seed for deterministic record generation")]
    seed: Option<u64>,

    #[arg(long, help = "JSON engine config; missing fields use defaults")]
    config: Option<String>,

    #[arg(long, default_value_t = 0.1)]
    lat_delta: f64,

    #[arg(long, default_value_t = 0.1)]
    lng_delta: f64,

    #[arg(long, value_parser = parse_point, help = "Map centre as 'lat,lng'; defaults to the acquired location")]
    center: Option<GeoPoint>,

    #[arg(long, default_value_t = crate::config::constants::DEFAULT_SCREEN_WIDTH_PX)]
    screen_width: f64,

    #[arg(long, default_value_t = crate::config::constants::DEFAULT_SCREEN_HEIGHT_PX)]
    screen_height: f64,

    #[arg(short, long, default_value = "auto", help = "clustered, spread or auto")]
    mode: LayoutMode,

    #[arg(long, value_parser = parse_point, help = "Simulated GPS fix as 'lat,lng'; omit to simulate denied permission")]
    gps: Option<GeoPoint>,

    #[arg(short = 'S', long, default_value = "state")]
    state_dir: String,

    #[arg(long, help = "Record id to render with the selected icon")]
    selected: Option<i64>,

    #[arg(long, default_value_t = false)]
    enable_timing: bool,

    #[arg(short, long, default_value_t = false)]
    debug_logging: bool,
}

impl Args {
    pub fn records(&self) -> Option<&str> {
        self.records.as_deref()
    }

    pub fn random(&self) -> Option<usize> {
        self.random
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn lat_delta(&self) -> f64 {
        self.lat_delta
    }

    pub fn lng_delta(&self) -> f64 {
        self.lng_delta
    }

    pub fn center(&self) -> Option<GeoPoint> {
        self.center
    }

    pub fn screen_width(&self) -> f64 {
        self.screen_width
    }

    pub fn screen_height(&self) -> f64 {
        self.screen_height
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn gps(&self) -> Option<GeoPoint> {
        self.gps
    }

    pub fn state_dir(&self) -> &str {
        &self.state_dir
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_point_arguments() {
        let args = Args::try_parse_from([
            "marker-engine", "--center", "56.95, 24.10", "--gps", "57.0,24.2", "--mode", "spread",
        ]).unwrap();
        assert_eq!(args.center(), Some(GeoPoint::new(56.95, 24.10)));
        assert_eq!(args.gps(), Some(GeoPoint::new(57.0, 24.2)));
        assert_eq!(args.mode(), LayoutMode::Spread);
        assert_eq!(args.lat_delta(), 0.1);
    }

    #[test]
    fn rejects_bad_point() {
        assert!(Args::try_parse_from(["marker-engine", "--center", "56.95"]).is_err());
    }
}
