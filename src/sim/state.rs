//! Match state and supporting types
//!
//! Plain data only; the rules that mutate it live in `tick`.

use serde::{Deserialize, Serialize};

use super::ramps::Lane;
use crate::profile::SkinProfile;
use crate::tuning::{MatchTuning, SkillTuning};

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Scene loaded, waiting for the first start command
    #[default]
    WaitingStart,
    /// Active gameplay
    Playing,
    Paused,
    /// Out of lives; terminal until restart
    GameOver,
    /// Level timer ran out; waiting for next-level
    StageCleared,
}

impl GamePhase {
    /// Pause/resume is only meaningful between these two
    #[inline]
    pub fn can_toggle_pause(self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::Paused)
    }
}

/// Who the player is (cosmetically) competing with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Solo,
    Bot,
    Duo,
}

impl MatchMode {
    #[inline]
    pub fn is_multiplayer(self) -> bool {
        self != MatchMode::Solo
    }
}

/// Highest life count allowed for a loadout
pub fn max_lives(rules: &MatchTuning, skins: &SkinProfile, mode: MatchMode) -> u32 {
    let cap = if mode.is_multiplayer() {
        rules.max_lives_multiplayer
    } else {
        rules.max_lives_single
    };
    let bonus = if skins.iron_body_owned { rules.iron_body_bonus } else { 0 };
    (rules.initial_lives + bonus).min(cap)
}

/// Skill cooldown counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillState {
    /// Time until the tail can burn a missed egg; ready at 0
    pub tail_ms: f32,
    /// Time until wings fire a magnet burst
    pub wings_ms: f32,
    /// Time until legs charge a dodge
    pub legs_ms: f32,
    pub legs_charged: bool,
}

impl SkillState {
    /// Fresh counters for a loadout: tail starts ready, wings and legs start a full cycle
    pub fn for_skins(skins: &SkinProfile, tuning: &SkillTuning) -> Self {
        Self {
            tail_ms: 0.0,
            wings_ms: SkillTuning::cooldown_for(&tuning.wings_cooldown_ms, skins.wings_tier).unwrap_or(0.0),
            legs_ms: SkillTuning::cooldown_for(&tuning.legs_cooldown_ms, skins.legs_tier).unwrap_or(0.0),
            legs_charged: false,
        }
    }
}

/// Background and ramp colours for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTheme {
    pub background: u32,
    pub ramp: u32,
}

const fn theme(background: u32, ramp: u32) -> LevelTheme {
    LevelTheme { background, ramp }
}

/// Level colour schemes, cycled when the level index runs past the end
pub const LEVEL_THEMES: [LevelTheme; 20] = [
    theme(0x000000, 0x334155),
    theme(0x1e293b, 0x475569),
    theme(0x2d1b0d, 0x5c4033),
    theme(0x064e3b, 0x065f46),
    theme(0x4c1d95, 0x5b21b6),
    theme(0x701a75, 0x86198f),
    theme(0x111827, 0x374151),
    theme(0x450a0a, 0x7f1d1d),
    theme(0x0f172a, 0x1e293b),
    theme(0x14532d, 0x166534),
    theme(0x164e63, 0x155e75),
    theme(0x312e81, 0x3730a3),
    theme(0x1e1b4b, 0x312e81),
    theme(0x3f6212, 0x4d7c0f),
    theme(0x831843, 0x9d174d),
    theme(0x020617, 0x0f172a),
    theme(0x171717, 0x262626),
    theme(0x18181b, 0x27272a),
    theme(0x0c0a09, 0x1c1917),
    theme(0x111827, 0xffffff),
];

pub fn theme_for_level(level: u32) -> LevelTheme {
    LEVEL_THEMES[level as usize % LEVEL_THEMES.len()]
}

/// Mutable match bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub phase: GamePhase,
    pub mode: MatchMode,
    /// Never decreases between restarts
    pub score: u64,
    /// Always within [0, max_lives]
    pub lives: u32,
    pub max_lives: u32,
    /// 0-based level index
    pub level: u32,
    pub hard: bool,
    pub dragon_lane: Lane,
    /// Unfrozen play time in this level (drives difficulty)
    pub level_elapsed_ms: f32,
    /// Countdown to stage clear
    pub level_remaining_ms: f32,
    /// Time since the last spawn
    pub spawn_timer_ms: f32,
    /// Monotonic match clock fed to the boost timers
    pub clock_ms: f64,
    pub skills: SkillState,
    /// Currency totals mirrored for the HUD
    pub stars: u64,
    pub scales: u64,
    /// Only the very first start waits for an explicit start command
    pub first_start: bool,
    /// Last whole-second value sent to the UI
    pub(crate) reported_seconds: Option<u32>,
}

impl MatchState {
    pub fn new(rules: &MatchTuning) -> Self {
        Self {
            phase: GamePhase::WaitingStart,
            mode: MatchMode::Solo,
            score: 0,
            lives: rules.initial_lives,
            max_lives: rules.initial_lives,
            level: 0,
            hard: false,
            dragon_lane: Lane::LeftTop,
            level_elapsed_ms: 0.0,
            level_remaining_ms: rules.level_duration_ms,
            spawn_timer_ms: 0.0,
            clock_ms: 0.0,
            skills: SkillState::default(),
            stars: 0,
            scales: 0,
            first_start: true,
            reported_seconds: None,
        }
    }

    /// Whole seconds left on the level clock, rounded up
    #[inline]
    pub fn timer_seconds(&self) -> u32 {
        (self.level_remaining_ms.max(0.0) / 1000.0).ceil() as u32
    }
}
