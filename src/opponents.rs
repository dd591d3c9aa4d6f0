//! Pseudo-opponents for versus and co-op matches
//!
//! Neither opponent plays the game. They follow the local player's score and
//! lives, add some noise on a fixed cadence, and produce the combined score
//! submission when the match ends.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::api::ScoreSubmission;
use crate::profile::PlayerProfile;

/// Display name of the bot
pub const BOT_NAME: &str = "DragonBot";

const BOT_TICK_MS: f32 = 1000.0;
const DUO_TICK_MS: f32 = 1500.0;
const OPPONENT_LIVES: u32 = 3;

/// Opponent status shown next to the player's HUD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentUpdate {
    pub name: String,
    pub score: u64,
    pub lives: u32,
    pub is_bot: bool,
}

pub trait Opponent {
    /// Begin a fresh match (stops any running one first)
    fn start(&mut self, player_lives: u32) -> Option<OpponentUpdate>;
    fn stop(&mut self);
    fn is_active(&self) -> bool;
    fn on_player_score(&mut self, score: u64) -> Option<OpponentUpdate>;
    fn on_player_lives(&mut self, lives: u32) -> Option<OpponentUpdate>;
    /// Advance the opponent's own clock
    fn tick(&mut self, delta_ms: f32) -> Option<OpponentUpdate>;
    /// Final combined result; stops the opponent
    fn on_game_over(&mut self, final_score: u64, profile: &PlayerProfile) -> Option<ScoreSubmission>;
}

/// Accumulates frame time into fixed-interval ticks
#[derive(Debug, Clone)]
struct Cadence {
    interval_ms: f32,
    acc_ms: f32,
}

impl Cadence {
    fn new(interval_ms: f32) -> Self {
        Self { interval_ms, acc_ms: 0.0 }
    }

    /// Number of whole intervals elapsed
    fn advance(&mut self, delta_ms: f32) -> u32 {
        if delta_ms.is_nan() || delta_ms <= 0.0 {
            return 0;
        }
        self.acc_ms += delta_ms;
        let mut fired = 0;
        while self.acc_ms >= self.interval_ms {
            self.acc_ms -= self.interval_ms;
            fired += 1;
        }
        fired
    }

    fn reset(&mut self) {
        self.acc_ms = 0.0;
    }
}

/// Versus bot trailing the player at 70% of their score
pub struct BotOpponent {
    rng: Pcg32,
    cadence: Cadence,
    active: bool,
    score: u64,
    lives: u32,
    player_lives: u32,
    /// Fractional lives owed after the player loses some
    life_debt: f32,
}

impl BotOpponent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            cadence: Cadence::new(BOT_TICK_MS),
            active: false,
            score: 0,
            lives: OPPONENT_LIVES,
            player_lives: OPPONENT_LIVES,
            life_debt: 0.0,
        }
    }

    fn update(&self) -> OpponentUpdate {
        OpponentUpdate {
            name: BOT_NAME.to_string(),
            score: self.score,
            lives: self.lives,
            is_bot: true,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }
}

impl Opponent for BotOpponent {
    fn start(&mut self, player_lives: u32) -> Option<OpponentUpdate> {
        self.stop();
        self.active = true;
        self.score = 0;
        self.lives = OPPONENT_LIVES;
        self.player_lives = player_lives;
        self.life_debt = 0.0;
        self.cadence.reset();
        log::info!("{BOT_NAME} joined the match");
        None
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.cadence.reset();
        log::debug!("{BOT_NAME} stopped");
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn on_player_score(&mut self, score: u64) -> Option<OpponentUpdate> {
        if !self.active {
            return None;
        }
        self.score = (score as f64 * 0.7).floor() as u64;
        Some(self.update())
    }

    fn on_player_lives(&mut self, lives: u32) -> Option<OpponentUpdate> {
        if !self.active {
            return None;
        }
        if lives < self.player_lives {
            self.life_debt += (self.player_lives - lives) as f32 * 0.5;
        } else if lives > self.player_lives && self.rng.random::<f32>() < 0.3 {
            self.lives += 1;
        }
        self.player_lives = lives;
        None
    }

    fn tick(&mut self, delta_ms: f32) -> Option<OpponentUpdate> {
        if !self.active {
            return None;
        }
        let mut changed = false;
        for _ in 0..self.cadence.advance(delta_ms) {
            if self.life_debt >= 1.0 && self.rng.random::<f32>() < 0.4 {
                self.lives = self.lives.saturating_sub(1);
                self.life_debt -= 1.0;
                changed = true;
            }
        }
        changed.then(|| self.update())
    }

    fn on_game_over(&mut self, final_score: u64, profile: &PlayerProfile) -> Option<ScoreSubmission> {
        if !self.active {
            return None;
        }
        let combined = final_score + self.score;
        self.stop();
        Some(ScoreSubmission::vs_bot(combined, profile))
    }
}

/// Co-op partner tracking at 90% of the player's score plus noise
pub struct DuoOpponent {
    rng: Pcg32,
    cadence: Cadence,
    partner: String,
    active: bool,
    score: u64,
    lives: u32,
}

impl DuoOpponent {
    pub fn new(seed: u64, partner: impl Into<String>) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            cadence: Cadence::new(DUO_TICK_MS),
            partner: partner.into(),
            active: false,
            score: 0,
            lives: OPPONENT_LIVES,
        }
    }

    fn update(&self) -> OpponentUpdate {
        OpponentUpdate {
            name: self.partner.clone(),
            score: self.score,
            lives: self.lives,
            is_bot: false,
        }
    }

    pub fn partner(&self) -> &str {
        &self.partner
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }
}

impl Opponent for DuoOpponent {
    fn start(&mut self, _player_lives: u32) -> Option<OpponentUpdate> {
        self.stop();
        self.active = true;
        self.score = 0;
        self.lives = OPPONENT_LIVES;
        self.cadence.reset();
        log::info!("Duo partner {} joined", self.partner);
        Some(self.update())
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.cadence.reset();
        log::debug!("Duo partner {} left", self.partner);
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn on_player_score(&mut self, score: u64) -> Option<OpponentUpdate> {
        if !self.active {
            return None;
        }
        let noise = (self.rng.random::<f32>() * 50.0).floor() as u64;
        self.score = (score as f64 * 0.9).floor() as u64 + noise;
        Some(self.update())
    }

    fn on_player_lives(&mut self, _lives: u32) -> Option<OpponentUpdate> {
        None
    }

    fn tick(&mut self, delta_ms: f32) -> Option<OpponentUpdate> {
        if !self.active {
            return None;
        }
        let mut changed = false;
        for _ in 0..self.cadence.advance(delta_ms) {
            if self.rng.random::<f32>() > 0.6 {
                self.score += 50;
                changed = true;
            }
            if self.rng.random::<f32>() > 0.95 && self.lives > 0 {
                self.lives -= 1;
                changed = true;
            }
        }
        changed.then(|| self.update())
    }

    fn on_game_over(&mut self, final_score: u64, profile: &PlayerProfile) -> Option<ScoreSubmission> {
        if !self.active {
            return None;
        }
        let combined = final_score + self.score;
        let submission = ScoreSubmission::duo(combined, profile, &self.partner);
        self.stop();
        Some(submission)
    }
}
