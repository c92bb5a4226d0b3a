// Overlap Resolution Constants
pub const BUCKET_PRECISION_DECIMALS: i32 = 4;           // ~11 m buckets
pub const GOLDEN_ANGLE_DEGREES: f64 = 137.5;
pub const SPIRAL_RADIUS_DEGREES: f64 = 0.0003;          // ~30 m at the equator

// Clustering Constants
pub const CLUSTER_RADIUS_PX: f64 = 60.0;
pub const DEFAULT_SCREEN_WIDTH_PX: f64 = 390.0;
pub const DEFAULT_SCREEN_HEIGHT_PX: f64 = 844.0;
pub const MIN_VIEWPORT_DELTA: f64 = 0.0005;
pub const SPREAD_BELOW_LATITUDE_DELTA: f64 = 0.01;      // Auto layout stops clustering below this

// Marker Icon Constants
pub const BUDGET_TIER_MAX: f64 = 25.0;
pub const STANDARD_TIER_MAX: f64 = 75.0;
pub const ICON_CACHE_CAPACITY: usize = 256;

pub const NORMAL_ICON_HEIGHT_PX: u32 = 32;
pub const SELECTED_ICON_HEIGHT_PX: u32 = 42;
pub const ICON_MIN_WIDTH_PX: u32 = 44;
pub const ICON_CHAR_WIDTH_PX: u32 = 8;
pub const URGENT_RING_WIDTH_PX: u32 = 3;

pub const BUDGET_COLOR: &str = "#22c55e";
pub const STANDARD_COLOR: &str = "#3b82f6";
pub const PREMIUM_GRADIENT: [&str; 2] = ["#8b5cf6", "#ec4899"];
pub const URGENT_RING_COLOR: &str = "#ef4444";
pub const CLUSTER_COLOR: &str = "#0f172a";
pub const CURRENCY_SYMBOL: &str = "€";

// Location Constants
pub const LOCATION_STORAGE_KEY: &str = "last_known_location";
pub const LOCATION_MAX_AGE_HOURS: i64 = 24;
pub const LOCATION_CLOCK_SKEW_MINUTES: i64 = 5;       // future timestamps tolerated up to this
pub const SENSOR_TIMEOUT_MS: u64 = 5_000;
pub const MOVEMENT_THRESHOLD_DEGREES: f64 = 0.005;      // ~500 m, compared as L1 distance

// Service region (Latvia with a small margin)
pub const SERVICE_REGION_MIN_LAT: f64 = 55.6;
pub const SERVICE_REGION_MAX_LAT: f64 = 58.1;
pub const SERVICE_REGION_MIN_LNG: f64 = 20.9;
pub const SERVICE_REGION_MAX_LNG: f64 = 28.3;

// Riga city centre
pub const DEFAULT_LATITUDE: f64 = 56.9496;
pub const DEFAULT_LONGITUDE: f64 = 24.1052;

// Geometry
pub const EARTH_RADIUS_KM: f64 = 6371.0;
