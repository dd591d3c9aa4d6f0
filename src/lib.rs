//! Dragon Egg - catch falling eggs with a dragon
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (ramps, eggs, boosts, match rules)
//! - `opponents`: Cosmetic bot/duo pseudo-opponents
//! - `bridge`: Typed commands in, typed UI events out
//! - `profile` / `persistence`: Player profile snapshot and its stores
//! - `api`: Score submission boundary
//! - `session`: Host glue tying the above together
//! - `platform` / `audio` / `settings`: Host services and preferences
//! - `tuning`: Data-driven game balance

pub mod api;
pub mod audio;
pub mod bridge;
pub mod highscores;
pub mod opponents;
pub mod persistence;
pub mod platform;
pub mod profile;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use bridge::{Command, EventQueue, UiEvent};
pub use highscores::HighScores;
pub use profile::PlayerProfile;
pub use session::GameSession;
pub use settings::{Settings, SoundSettings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical world width the ramp layout is authored against
    pub const WORLD_WIDTH: f32 = 800.0;
    /// Logical world height the ramp layout is authored against
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Largest frame delta the simulation accepts (tab backgrounding etc.)
    pub const MAX_FRAME_MS: f32 = 250.0;

    /// Default capacity of the outbound UI event queue
    pub const EVENT_QUEUE_CAPACITY: usize = 256;
}

/// Sanitize a host-reported frame delta: NaN/negative become 0, huge deltas are clamped
#[inline]
pub fn clamp_frame_ms(delta_ms: f32) -> f32 {
    if delta_ms.is_nan() || delta_ms <= 0.0 {
        0.0
    } else {
        delta_ms.min(consts::MAX_FRAME_MS)
    }
}

/// Axis-aligned overlap test between two rectangles given as (center, half extents)
#[inline]
pub fn rects_overlap(a_center: Vec2, a_half: Vec2, b_center: Vec2, b_half: Vec2) -> bool {
    let d = (a_center - b_center).abs();
    d.x <= a_half.x + b_half.x && d.y <= a_half.y + b_half.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_frame_ms() {
        assert_eq!(clamp_frame_ms(-5.0), 0.0);
        assert_eq!(clamp_frame_ms(f32::NAN), 0.0);
        assert_eq!(clamp_frame_ms(16.0), 16.0);
        assert_eq!(clamp_frame_ms(10_000.0), consts::MAX_FRAME_MS);
    }

    #[test]
    fn test_rects_overlap() {
        let half = Vec2::splat(10.0);
        assert!(rects_overlap(Vec2::ZERO, half, Vec2::new(19.0, 0.0), half));
        assert!(!rects_overlap(Vec2::ZERO, half, Vec2::new(21.0, 0.0), half));
        assert!(!rects_overlap(Vec2::ZERO, half, Vec2::new(0.0, 25.0), half));
    }
}
