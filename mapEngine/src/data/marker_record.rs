use serde::{Deserialize, Serialize};
use super::geo::GeoPoint;

/// Anything that can be placed on the map.
pub trait Positioned {
    /// Real coordinate, or `None` when it is absent or not finite.
    fn position(&self) -> Option<GeoPoint>;

    /// Identity used for single-marker placement ids.
    fn marker_key(&self) -> String;
}

/// A task or service offering as delivered by the listings API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: i64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "isUrgent")]
    pub is_urgent: bool,
}

impl MarkerRecord {
    pub fn new(id: i64, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            latitude: Some(latitude),
            longitude: Some(longitude),
            budget: 0.0,
            category: String::new(),
            is_urgent: false,
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = budget.max(0.0);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn urgent(mut self) -> Self {
        self.is_urgent = true;
        self
    }
}

impl Positioned for MarkerRecord {
    fn position(&self) -> Option<GeoPoint> {
        let point = GeoPoint::new(self.latitude?, self.longitude?);
        point.is_finite().then_some(point)
    }

    fn marker_key(&self) -> String {
        self.id.to_string()
    }
}
