//! Simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Variable frame deltas, every rate scaled by elapsed ms
//! - Seeded RNG only
//! - No rendering, storage, or network dependencies

pub mod boosts;
pub mod difficulty;
pub mod egg;
pub mod eggs;
pub mod ramps;
pub mod state;
pub mod tick;

pub use boosts::{BoostFlags, BoostKind, BoostTimers};
pub use difficulty::{DifficultyCurve, DifficultySample};
pub use egg::{EGG_TYPES, Egg, EggKind, EggSpec, EggState};
pub use eggs::{EggOutcome, EggReport, EggSimulation, FrameContext, Hitbox, Splat};
pub use ramps::{Lane, Ramp, RampGeometry};
pub use state::{GamePhase, LEVEL_THEMES, LevelTheme, MatchMode, MatchState, SkillState, theme_for_level};
pub use tick::{MatchController, ProfileEffect, Viewports};
