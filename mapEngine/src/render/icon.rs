use serde::Serialize;
use std::fmt;
use crate::config::constants::*;
use crate::config::engine_config::IconConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriceTier {
    Budget,
    Standard,
    Premium,
}

impl PriceTier {
    pub fn from_budget(budget: f64, config: &IconConfig) -> Self {
        if budget <= config.budget_tier_max {
            PriceTier::Budget
        } else if budget <= config.standard_tier_max {
            PriceTier::Standard
        } else {
            PriceTier::Premium
        }
    }

    pub fn fill(&self) -> Fill {
        match self {
            PriceTier::Budget => Fill::Solid(BUDGET_COLOR.to_string()),
            PriceTier::Standard => Fill::Solid(STANDARD_COLOR.to_string()),
            PriceTier::Premium => Fill::Gradient(PREMIUM_GRADIENT.iter().map(|c| c.to_string()).collect()),
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceTier::Budget => write!(f, "budget"),
            PriceTier::Standard => write!(f, "standard"),
            PriceTier::Premium => write!(f, "premium"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Fill {
    Solid(String),
    Gradient(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ring {
    pub color: String,
    pub width_px: u32,
}

/// Everything the map layer needs to draw one marker glyph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IconDescriptor {
    pub label: String,
    pub tier: Option<PriceTier>,
    pub fill: Fill,
    pub ring: Option<Ring>,
    pub width_px: u32,
    pub height_px: u32,
    /// Fraction of the icon box that sits on the coordinate, (x, y).
    pub anchor: (f64, f64),
    pub shadow: bool,
    pub selected: bool,
}

/// Whole amounts print without decimals; anything else keeps cents, trailing zeros trimmed.
pub fn price_label(budget: f64) -> String {
    let cents = if budget.is_finite() { (budget.max(0.0) * 100.0).round() } else { 0.0 };
    if cents % 100.0 == 0.0 {
        return format!("{}{}", CURRENCY_SYMBOL, (cents / 100.0) as u64);
    }
    let amount = format!("{:.2}", cents / 100.0);
    format!("{}{}", CURRENCY_SYMBOL, amount.trim_end_matches('0'))
}

/// Price bubble for a single record.
pub fn build_marker_icon(budget: f64, is_selected: bool, is_urgent: bool, config: &IconConfig) -> IconDescriptor {
    let tier = PriceTier::from_budget(budget, config);
    let label = price_label(budget);

    let height_px = if is_selected { SELECTED_ICON_HEIGHT_PX } else { NORMAL_ICON_HEIGHT_PX };
    let text_width = label.chars().count() as u32 * ICON_CHAR_WIDTH_PX + height_px / 2;
    let width_px = text_width.max(ICON_MIN_WIDTH_PX);

    IconDescriptor {
        label,
        tier: Some(tier),
        fill: tier.fill(),
        ring: is_urgent.then(|| Ring {
            color: URGENT_RING_COLOR.to_string(),
            width_px: URGENT_RING_WIDTH_PX,
        }),
        width_px,
        height_px,
        // Selected bubbles grow upwards from a pointer tip below the box
        anchor: if is_selected { (0.5, 1.15) } else { (0.5, 1.0) },
        shadow: is_selected,
        selected: is_selected,
    }
}

/// Round count bubble for a cluster.
pub fn build_cluster_icon(count: usize) -> IconDescriptor {
    let diameter = match count {
        0..=9 => 36,
        10..=49 => 44,
        _ => 54,
    };

    IconDescriptor {
        label: if count > 99 { "99+".to_string() } else { count.to_string() },
        tier: None,
        fill: Fill::Solid(CLUSTER_COLOR.to_string()),
        ring: None,
        width_px: diameter,
        height_px: diameter,
        anchor: (0.5, 0.5),
        shadow: false,
        selected: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive() {
        let cfg = IconConfig::default();
        assert_eq!(PriceTier::from_budget(0.0, &cfg), PriceTier::Budget);
        assert_eq!(PriceTier::from_budget(25.0, &cfg), PriceTier::Budget);
        assert_eq!(PriceTier::from_budget(25.5, &cfg), PriceTier::Standard);
        assert_eq!(PriceTier::from_budget(75.0, &cfg), PriceTier::Standard);
        assert_eq!(PriceTier::from_budget(75.01, &cfg), PriceTier::Premium);
    }

    #[test]
    fn premium_uses_gradient() {
        let icon = build_marker_icon(120.0, false, false, &IconConfig::default());
        assert!(matches!(icon.fill, Fill::Gradient(ref stops) if stops.len() == 2));
        assert_eq!(icon.label, "€120");
    }

    #[test]
    fn fractional_budget_keeps_cents() {
        assert_eq!(price_label(25.4), "€25.4");
        assert_eq!(price_label(25.05), "€25.05");
        assert_eq!(price_label(50.0), "€50");
        assert_eq!(price_label(-3.0), "€0");

        let icon = build_marker_icon(25.4, false, false, &IconConfig::default());
        assert_eq!(icon.tier, Some(PriceTier::Standard));
        assert_eq!(icon.label, "€25.4");
    }

    #[test]
    fn urgent_gets_ring_and_selected_is_larger() {
        let cfg = IconConfig::default();
        let normal = build_marker_icon(50.0, false, true, &cfg);
        let selected = build_marker_icon(50.0, true, true, &cfg);

        assert!(normal.ring.is_some());
        assert!(selected.height_px > normal.height_px);
        assert_ne!(selected.anchor, normal.anchor);
        assert!(selected.shadow && !normal.shadow);
        assert!(build_marker_icon(50.0, false, false, &cfg).ring.is_none());
    }

    #[test]
    fn cluster_icon_grows_with_count() {
        assert!(build_cluster_icon(60).width_px > build_cluster_icon(3).width_px);
        assert_eq!(build_cluster_icon(150).label, "99+");
    }
}
