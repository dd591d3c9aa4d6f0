//! Difficulty curve: elapsed level time -> spawn pacing and egg speed
//!
//! Two mechanisms stack multiplicatively on top of the linear step-down:
//! a compounding time ramp (every step) and the manual hard-mode multiplier.
//! The level index compounds a third, per-level speed step.

use serde::{Deserialize, Serialize};

use crate::tuning::DifficultyTuning;

/// Pacing for the current moment of a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySample {
    /// Delay between egg spawns
    pub spawn_interval_ms: f32,
    /// Time for an egg to ride a ramp from top to bottom
    pub travel_duration_ms: f32,
}

impl DifficultySample {
    /// Ramp progress per millisecond
    #[inline]
    pub fn travel_speed(&self) -> f32 {
        1.0 / self.travel_duration_ms.max(1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DifficultyCurve {
    tuning: DifficultyTuning,
}

impl DifficultyCurve {
    pub fn new(tuning: DifficultyTuning) -> Self {
        Self { tuning }
    }

    /// Number of completed difficulty steps
    pub fn steps(&self, elapsed_ms: f32) -> u32 {
        if elapsed_ms.is_nan() || elapsed_ms <= 0.0 || self.tuning.step_interval_ms <= 0.0 {
            return 0;
        }
        (elapsed_ms / self.tuning.step_interval_ms).floor() as u32
    }

    /// Combined speed multiplier from the time ramp, level, and hard mode
    pub fn speed_multiplier(&self, elapsed_ms: f32, level: u32, hard: bool) -> f32 {
        let t = &self.tuning;
        let time_ramp = t.time_ramp_mult.powi(self.steps(elapsed_ms) as i32);
        let level_step = t.level_speed_step.powi(level as i32);
        let hard = if hard { t.hard_multiplier } else { 1.0 };
        time_ramp * level_step * hard
    }

    pub fn sample(&self, elapsed_ms: f32, level: u32, hard: bool) -> DifficultySample {
        let t = &self.tuning;
        let reduction = self.steps(elapsed_ms) as f32 * t.step_reduction_ms;

        let spawn_interval_ms = (t.spawn_interval_start_ms - reduction).max(t.spawn_interval_min_ms);
        let base_travel = (t.travel_duration_start_ms - reduction).max(t.travel_duration_min_ms);
        let travel_duration_ms = (base_travel / self.speed_multiplier(elapsed_ms, level, hard))
            .max(t.travel_duration_floor_ms);

        DifficultySample {
            spawn_interval_ms,
            travel_duration_ms,
        }
    }
}
