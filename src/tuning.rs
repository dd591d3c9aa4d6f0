//! Data-driven game balance
//!
//! Every tunable number lives here. Defaults reproduce the shipped game; a JSON
//! document may override any subset of fields.

use serde::{Deserialize, Serialize};

/// Ramp layout in logical world units
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RampTuning {
    /// Horizontal length of each ramp
    pub ramp_width: f32,
    /// Horizontal gap between ramp end and the dragon's catch point
    pub gap_to_catch: f32,
    pub top_y_start: f32,
    pub top_y_end: f32,
    pub bottom_y_start: f32,
    pub bottom_y_end: f32,
    /// Catch point sits this far below the ramp end
    pub catch_drop: f32,
    /// Distance from ramp centerline to egg center (half ramp thickness + egg radius)
    pub surface_offset: f32,
    /// Floor line sits this far above the bottom of the viewport
    pub floor_inset: f32,
}

impl Default for RampTuning {
    fn default() -> Self {
        Self {
            ramp_width: 280.0,
            gap_to_catch: 40.0,
            top_y_start: 130.0,
            top_y_end: 260.0,
            bottom_y_start: 330.0,
            bottom_y_end: 460.0,
            catch_drop: 10.0,
            surface_offset: 12.0 + 15.0,
            floor_inset: 40.0,
        }
    }
}

/// Spawn pacing and egg speed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Length of one difficulty step (ms of active level time)
    pub step_interval_ms: f32,
    /// Amount shaved off spawn interval and travel duration per step
    pub step_reduction_ms: f32,
    pub spawn_interval_start_ms: f32,
    pub spawn_interval_min_ms: f32,
    pub travel_duration_start_ms: f32,
    pub travel_duration_min_ms: f32,
    /// Speed multiplier compounded once per step
    pub time_ramp_mult: f32,
    /// Speed multiplier compounded once per level
    pub level_speed_step: f32,
    /// Speed multiplier in hard mode
    pub hard_multiplier: f32,
    /// Absolute floor on travel duration after all multipliers
    pub travel_duration_floor_ms: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            step_interval_ms: 10_000.0,
            step_reduction_ms: 100.0,
            spawn_interval_start_ms: 1200.0,
            spawn_interval_min_ms: 600.0,
            travel_duration_start_ms: 2000.0,
            travel_duration_min_ms: 1000.0,
            time_ramp_mult: 1.10,
            level_speed_step: 1.05,
            hard_multiplier: 1.5,
            travel_duration_floor_ms: 400.0,
        }
    }
}

/// Egg motion (all speeds in px/ms, accelerations in px/ms²)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EggTuning {
    /// Gravity while high above the floor
    pub ballistic_gravity: f32,
    /// Gravity once within `fall_zone` of the floor
    pub fall_gravity: f32,
    pub fall_zone: f32,
    /// Horizontal acceleration toward screen center while falling
    pub center_drift_accel: f32,
    pub max_exit_speed: f32,
    /// Exit speed = travel speed * track length * this factor
    pub exit_speed_factor: f32,
    /// Exit speed multiplier with wings tier >= 1
    pub glide_multiplier: f32,
    /// Ramp speed multiplier with tail tier >= 1
    pub heavy_tail_multiplier: f32,
    pub magnet_pull_speed: f32,
    /// Radians per 16 ms while magnet-latched
    pub magnet_spin: f32,
    /// Radians per 16.6 ms while falling
    pub fall_spin: f32,
    /// Eggs past this progress get the warning tint
    pub near_threshold: f32,
    pub splat_lifetime_ms: f32,
}

impl Default for EggTuning {
    fn default() -> Self {
        Self {
            ballistic_gravity: 0.004,
            fall_gravity: 0.012,
            fall_zone: 150.0,
            center_drift_accel: 0.00008,
            max_exit_speed: 0.7,
            exit_speed_factor: 12.0,
            glide_multiplier: 1.5,
            heavy_tail_multiplier: 0.85,
            magnet_pull_speed: 0.8,
            magnet_spin: 0.2,
            fall_spin: 0.05,
            near_threshold: 0.9,
            splat_lifetime_ms: 1500.0,
        }
    }
}

/// Timed power-ups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostTuning {
    pub freeze_ms: f32,
    pub magnet_ms: f32,
    pub shield_ms: f32,
}

impl Default for BoostTuning {
    fn default() -> Self {
        Self {
            freeze_ms: 10_000.0,
            magnet_ms: 10_000.0,
            shield_ms: 10_000.0,
        }
    }
}

/// Purchasable skill cooldowns, indexed by tier - 1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillTuning {
    pub tail_cooldown_ms: Vec<f32>,
    pub wings_cooldown_ms: Vec<f32>,
    pub legs_cooldown_ms: Vec<f32>,
    /// Duration of the auto-triggered magnet burst from wings
    pub wings_magnet_ms: f32,
    /// Tail tier that enlarges the catch hitbox
    pub tail_reach_tier: u8,
    /// Extra vertical reach at `tail_reach_tier`
    pub tail_reach: f32,
}

impl Default for SkillTuning {
    fn default() -> Self {
        Self {
            tail_cooldown_ms: vec![30_000.0, 20_000.0, 10_000.0],
            wings_cooldown_ms: vec![24_000.0, 17_000.0, 11_000.0],
            legs_cooldown_ms: vec![25_000.0, 14_000.0],
            wings_magnet_ms: 3000.0,
            tail_reach_tier: 3,
            tail_reach: 300.0,
        }
    }
}

impl SkillTuning {
    /// Cooldown for a tier from a per-tier table; tier 0 means not owned.
    /// Tiers above the table reuse its last entry.
    pub fn cooldown_for(table: &[f32], tier: u8) -> Option<f32> {
        if tier == 0 {
            return None;
        }
        let idx = (tier as usize - 1).min(table.len().checked_sub(1)?);
        table.get(idx).copied()
    }
}

/// Lives, scoring, and level pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTuning {
    pub initial_lives: u32,
    /// Extra max life from the iron body upgrade
    pub iron_body_bonus: u32,
    pub max_lives_single: u32,
    pub max_lives_multiplayer: u32,
    /// A bonus life is awarded each time score crosses a multiple of this
    pub bonus_life_every: u32,
    pub crystal_body_multiplier: f32,
    pub level_duration_ms: f32,
    /// Half extents of the dragon's catch hitbox
    pub dragon_half_width: f32,
    pub dragon_half_height: f32,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            initial_lives: 6,
            iron_body_bonus: 1,
            max_lives_single: 7,
            max_lives_multiplayer: 10,
            bonus_life_every: 1000,
            crystal_body_multiplier: 1.2,
            level_duration_ms: 60_000.0,
            dragon_half_width: 50.0,
            dragon_half_height: 45.0,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ramps: RampTuning,
    pub difficulty: DifficultyTuning,
    pub eggs: EggTuning,
    pub boosts: BoostTuning,
    pub skills: SkillTuning,
    pub rules: MatchTuning,
}

impl Tuning {
    /// Parse overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
