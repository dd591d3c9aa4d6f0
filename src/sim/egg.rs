//! Egg types and the egg entity

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ramps::Lane;

/// Egg categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum EggKind {
    #[default]
    White,
    Blue,
    /// Green
    Mithril,
    Golden,
    /// Hazard: costs a life when caught
    Bomb,
    Scale,
    Diamond,
    Star,
}

/// Static properties of an egg kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EggSpec {
    pub kind: EggKind,
    /// Spawn probability; the table sums to 1
    pub weight: f32,
    pub score: u32,
    /// Whether reaching the floor costs a life
    pub missable: bool,
    pub radius: f32,
    pub stars: u32,
    pub scales: u32,
}

/// Sum of the raw spawn chances below; each weight is its chance over this
const CHANCE_TOTAL: f32 = 1.10;

const fn spec(kind: EggKind, chance: f32, score: u32, missable: bool, radius: f32) -> EggSpec {
    EggSpec {
        kind,
        weight: chance / CHANCE_TOTAL,
        score,
        missable,
        radius,
        stars: 0,
        scales: 0,
    }
}

/// The egg table, in draw order
pub static EGG_TYPES: [EggSpec; 8] = [
    spec(EggKind::White, 0.45, 10, true, 14.0),
    spec(EggKind::Blue, 0.15, 15, true, 14.0),
    spec(EggKind::Mithril, 0.20, 20, true, 14.0),
    spec(EggKind::Golden, 0.10, 30, true, 14.0),
    spec(EggKind::Bomb, 0.10, 0, false, 12.0),
    EggSpec {
        scales: 1,
        ..spec(EggKind::Scale, 0.05, 0, false, 12.0)
    },
    // Diamond eggs are the premium currency, tracked as stars
    EggSpec {
        stars: 1,
        ..spec(EggKind::Diamond, 0.03, 0, false, 15.0)
    },
    EggSpec {
        stars: 1,
        ..spec(EggKind::Star, 0.02, 0, false, 15.0)
    },
];

impl EggKind {
    pub fn spec(self) -> &'static EggSpec {
        EGG_TYPES
            .iter()
            .find(|s| s.kind == self)
            .unwrap_or(&EGG_TYPES[0])
    }

    #[inline]
    pub fn is_hazard(self) -> bool {
        self == EggKind::Bomb
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EggKind::White => "white",
            EggKind::Blue => "blue",
            EggKind::Mithril => "mithril",
            EggKind::Golden => "golden",
            EggKind::Bomb => "bomb",
            EggKind::Scale => "scale",
            EggKind::Diamond => "diamond",
            EggKind::Star => "star",
        }
    }

    /// Parse a kind name; anything unrecognised is a plain white egg
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "blue" => EggKind::Blue,
            "mithril" | "green" => EggKind::Mithril,
            "golden" | "gold" => EggKind::Golden,
            "bomb" => EggKind::Bomb,
            "scale" => EggKind::Scale,
            "diamond" => EggKind::Diamond,
            "star" => EggKind::Star,
            _ => EggKind::White,
        }
    }

    /// Pick a kind from a uniform draw in [0, 1): first cumulative weight >= draw wins
    pub fn pick_weighted(draw: f32) -> Self {
        let mut acc = 0.0;
        for spec in &EGG_TYPES {
            acc += spec.weight;
            if draw <= acc {
                return spec.kind;
            }
        }
        EggKind::White
    }
}

impl From<String> for EggKind {
    fn from(name: String) -> Self {
        EggKind::from_name(&name)
    }
}

impl From<EggKind> for &'static str {
    fn from(kind: EggKind) -> Self {
        kind.as_str()
    }
}

/// Where an egg is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EggState {
    /// Riding the ramp at progress `t`
    OnRamp,
    /// Airborne after leaving the ramp end
    Falling,
    /// Pulled by the magnet; sticky for the rest of the egg's life
    Latched,
}

/// An egg in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Egg {
    pub id: u32,
    pub lane: Lane,
    pub kind: EggKind,
    pub state: EggState,
    /// Ramp progress in [0, 1]
    pub t: f32,
    /// Screen position (center)
    pub pos: Vec2,
    /// Velocity in px/ms, used once airborne
    pub vel: Vec2,
    pub rotation: f32,
    /// Depth scale: small when far up the ramp, full size near the dragon
    pub scale: f32,
    pub radius: f32,
    /// Warning tint near the ramp end
    pub near: bool,
    /// Exit speed multiplier captured at spawn (wings glide)
    pub glide: f32,
}

impl Egg {
    pub fn new(id: u32, lane: Lane, kind: EggKind, glide: f32) -> Self {
        Self {
            id,
            lane,
            kind,
            state: EggState::OnRamp,
            t: 0.0,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            scale: depth_scale(0.0),
            radius: kind.spec().radius,
            near: false,
            glide,
        }
    }

    #[inline]
    pub fn is_latched(&self) -> bool {
        self.state == EggState::Latched
    }

    /// Half extents of the egg's bounding box
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::splat(self.radius * self.scale)
    }
}

/// Depth scale for ramp progress
#[inline]
pub fn depth_scale(t: f32) -> f32 {
    0.5 + 0.5 * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let total: f32 = EGG_TYPES.iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_weights_keep_chance_ratios() {
        let w = |k: EggKind| k.spec().weight;
        assert!((w(EggKind::White) / w(EggKind::Blue) - 3.0).abs() < 1e-4);
        assert!((w(EggKind::Mithril) / w(EggKind::Golden) - 2.0).abs() < 1e-4);
        assert!((w(EggKind::White) - 0.45 / 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_pick_weighted_boundaries() {
        assert_eq!(EggKind::pick_weighted(0.0), EggKind::White);
        assert_eq!(EggKind::pick_weighted(0.40), EggKind::White);
        assert_eq!(EggKind::pick_weighted(0.41), EggKind::Blue);
        assert_eq!(EggKind::pick_weighted(0.85), EggKind::Bomb);
        assert_eq!(EggKind::pick_weighted(0.999), EggKind::Star);
        // Rounding past the table end falls back to white
        assert_eq!(EggKind::pick_weighted(1.5), EggKind::White);
    }

    #[test]
    fn test_every_kind_reachable() {
        let mut seen = std::collections::HashSet::new();
        for i in 0..1000 {
            seen.insert(EggKind::pick_weighted(i as f32 / 1000.0));
        }
        assert_eq!(seen.len(), EGG_TYPES.len());
    }

    #[test]
    fn test_unknown_kind_falls_back_to_white() {
        let kind: EggKind = serde_json::from_str("\"purple\"").unwrap();
        assert_eq!(kind, EggKind::White);
        let kind: EggKind = serde_json::from_str("\"golden\"").unwrap();
        assert_eq!(kind, EggKind::Golden);
        assert_eq!(serde_json::to_string(&EggKind::Bomb).unwrap(), "\"bomb\"");
    }

    #[test]
    fn test_currency_eggs_are_not_missable() {
        for kind in [EggKind::Bomb, EggKind::Scale, EggKind::Diamond, EggKind::Star] {
            assert!(!kind.spec().missable, "{kind:?}");
        }
        assert_eq!(EggKind::Scale.spec().scales, 1);
        assert_eq!(EggKind::Star.spec().stars, 1);
    }
}
