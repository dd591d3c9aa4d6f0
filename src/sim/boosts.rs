//! Timed power-ups
//!
//! At most one timer per kind. Activating a kind that is already running is a
//! silent no-op: no stacking, no refresh.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tuning::BoostTuning;

/// Power-up kinds with a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostKind {
    /// Stops eggs, spawning, and the level countdown
    Freeze,
    /// Pulls eggs to the dragon
    Magnet,
    /// Blocks life loss
    Shield,
}

impl BoostKind {
    pub const ALL: [BoostKind; 3] = [BoostKind::Freeze, BoostKind::Magnet, BoostKind::Shield];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoostKind::Freeze => "freeze",
            BoostKind::Magnet => "magnet",
            BoostKind::Shield => "shield",
        }
    }
}

/// Snapshot of which boosts are running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostFlags {
    pub frozen: bool,
    pub magnet: bool,
    pub shield: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoostTimers {
    /// Absolute expiry per active kind
    active: BTreeMap<BoostKind, f64>,
    /// Last clock value seen by `tick`
    now_ms: f64,
    flags: BoostFlags,
    durations: BoostTuning,
}

impl BoostTimers {
    pub fn new(durations: BoostTuning) -> Self {
        Self {
            durations,
            ..Default::default()
        }
    }

    /// Default duration for a kind
    pub fn default_duration(&self, kind: BoostKind) -> f32 {
        match kind {
            BoostKind::Freeze => self.durations.freeze_ms,
            BoostKind::Magnet => self.durations.magnet_ms,
            BoostKind::Shield => self.durations.shield_ms,
        }
    }

    /// Start a boost at the current clock. Returns false if it was already running.
    pub fn activate(&mut self, kind: BoostKind, duration_override_ms: Option<f32>) -> bool {
        if self.active.contains_key(&kind) {
            return false;
        }
        let duration = duration_override_ms
            .filter(|d| d.is_finite())
            .unwrap_or_else(|| self.default_duration(kind))
            .max(0.0);
        self.active.insert(kind, self.now_ms + duration as f64);
        self.update_flags();
        true
    }

    /// Advance the clock and drop expired timers. Returns true if the active set changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.now_ms = now_ms;
        let before = self.active.len();
        self.active.retain(|_, expiry| now_ms < *expiry);
        let changed = self.active.len() != before;
        if changed {
            self.update_flags();
        }
        changed
    }

    /// Time left on a boost, 0 if inactive
    pub fn remaining_ms(&self, kind: BoostKind) -> f32 {
        self.active
            .get(&kind)
            .map(|expiry| (expiry - self.now_ms).max(0.0) as f32)
            .unwrap_or(0.0)
    }

    #[inline]
    pub fn is_active(&self, kind: BoostKind) -> bool {
        self.active.contains_key(&kind)
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.flags.frozen
    }

    #[inline]
    pub fn is_magnet_active(&self) -> bool {
        self.flags.magnet
    }

    #[inline]
    pub fn is_shield_active(&self) -> bool {
        self.flags.shield
    }

    pub fn flags(&self) -> BoostFlags {
        self.flags
    }

    pub fn reset(&mut self) {
        self.active.clear();
        self.update_flags();
    }

    fn update_flags(&mut self) {
        self.flags = BoostFlags {
            frozen: self.active.contains_key(&BoostKind::Freeze),
            magnet: self.active.contains_key(&BoostKind::Magnet),
            shield: self.active.contains_key(&BoostKind::Shield),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timers() -> BoostTimers {
        BoostTimers::new(BoostTuning::default())
    }

    #[test]
    fn test_activate_sets_flag_and_expiry() {
        let mut b = timers();
        b.tick(1_000.0);
        assert!(b.activate(BoostKind::Freeze, None));
        assert!(b.is_frozen());
        assert_eq!(b.remaining_ms(BoostKind::Freeze), 10_000.0);

        b.tick(6_000.0);
        assert_eq!(b.remaining_ms(BoostKind::Freeze), 5_000.0);

        assert!(b.tick(11_000.0));
        assert!(!b.is_frozen());
        assert_eq!(b.remaining_ms(BoostKind::Freeze), 0.0);
    }

    #[test]
    fn test_reactivation_is_noop() {
        let mut b = timers();
        b.activate(BoostKind::Shield, None);
        b.tick(4_000.0);
        let before = b.remaining_ms(BoostKind::Shield);
        assert!(!b.activate(BoostKind::Shield, Some(60_000.0)));
        assert_eq!(b.remaining_ms(BoostKind::Shield), before);
    }

    #[test]
    fn test_duration_override() {
        let mut b = timers();
        b.activate(BoostKind::Magnet, Some(3_000.0));
        assert_eq!(b.remaining_ms(BoostKind::Magnet), 3_000.0);
        b.tick(3_000.0);
        assert!(!b.is_magnet_active());
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut b = timers();
        b.activate(BoostKind::Magnet, Some(1_000.0));
        b.activate(BoostKind::Shield, None);
        b.tick(2_000.0);
        assert!(!b.is_magnet_active());
        assert!(b.is_shield_active());
        assert!(!b.is_frozen());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut b = timers();
        for kind in BoostKind::ALL {
            b.activate(kind, None);
        }
        b.reset();
        assert_eq!(b.flags(), BoostFlags::default());
        assert!(b.activate(BoostKind::Freeze, None));
    }
}
