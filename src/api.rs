//! Score submission backend
//!
//! `ScoreApi` is the seam to the leaderboard service. The bundled
//! `MockScoreApi` keeps everything in memory (and LocalStorage on wasm) so the
//! game is fully playable offline.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::HighScores;
use crate::profile::PlayerProfile;

/// Minimum time between two submissions, in ms
pub const SUBMIT_INTERVAL_MS: f64 = 3000.0;

/// Name used when the player has none
pub const DEFAULT_DISPLAY_NAME: &str = "You";

/// Leaderboard bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Solo,
    Duo,
    SoloBot,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Solo => "solo",
            MatchType::Duo => "duo",
            MatchType::SoloBot => "solo_bot",
        }
    }
}

/// A finished match reported to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub score: u64,
    pub username: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    #[serde(default)]
    pub partner_name: Option<String>,
}

fn identity(profile: &PlayerProfile) -> (String, Option<String>) {
    let user_id = (!profile.user_id.is_empty()).then(|| profile.user_id.clone());
    (profile.username.clone(), user_id)
}

impl ScoreSubmission {
    pub fn solo(score: u64, profile: &PlayerProfile) -> Self {
        let (username, user_id) = identity(profile);
        Self {
            score,
            username,
            user_id,
            match_type: MatchType::Solo,
            partner_name: None,
        }
    }

    /// Versus-bot result: player and bot scores combined
    pub fn vs_bot(combined: u64, profile: &PlayerProfile) -> Self {
        Self {
            match_type: MatchType::SoloBot,
            ..Self::solo(combined, profile)
        }
    }

    /// Co-op result: local and partner scores combined
    pub fn duo(combined: u64, profile: &PlayerProfile, partner: &str) -> Self {
        Self {
            match_type: MatchType::Duo,
            partner_name: Some(partner.to_string()),
            ..Self::solo(combined, profile)
        }
    }

    /// Name shown on the leaderboard
    pub fn display_name(&self) -> String {
        let name = if self.username.trim().is_empty() {
            DEFAULT_DISPLAY_NAME
        } else {
            self.username.as_str()
        };
        match (&self.match_type, &self.partner_name) {
            (MatchType::Duo, Some(partner)) => format!("{name} + {partner}"),
            _ => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub success: bool,
    /// Best score of this name in the bucket
    pub high_score: u64,
    #[serde(default)]
    pub rank: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("submission rejected: {0}")]
    Rejected(String),
}

pub trait ScoreApi {
    fn submit_score(&mut self, submission: &ScoreSubmission, now_ms: f64) -> Result<ScoreResponse, ApiError>;
}

/// Per-key minimum interval between calls
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval_ms: f64,
    last_call: HashMap<String, f64>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(SUBMIT_INTERVAL_MS)
    }
}

impl RateLimiter {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_call: HashMap::new(),
        }
    }

    /// Record a call for `key`; false if it came too soon after the last one
    pub fn check(&mut self, key: &str, now_ms: f64) -> bool {
        if let Some(&last) = self.last_call.get(key) {
            if now_ms - last < self.interval_ms {
                return false;
            }
        }
        self.last_call.insert(key.to_string(), now_ms);
        true
    }
}

/// In-memory backend with per-bucket leaderboards
pub struct MockScoreApi {
    scores: HighScores,
    limiter: RateLimiter,
    rng: Pcg32,
    persist: bool,
}

impl MockScoreApi {
    pub fn new(seed: u64) -> Self {
        Self {
            scores: HighScores::new(),
            limiter: RateLimiter::default(),
            rng: Pcg32::seed_from_u64(seed),
            persist: false,
        }
    }

    /// Backed by the stored leaderboards, saving after every accepted score
    pub fn persistent(seed: u64) -> Self {
        Self {
            scores: HighScores::load(),
            persist: true,
            ..Self::new(seed)
        }
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }
}

impl ScoreApi for MockScoreApi {
    fn submit_score(&mut self, submission: &ScoreSubmission, now_ms: f64) -> Result<ScoreResponse, ApiError> {
        if !self.limiter.check("submitScore", now_ms) {
            return Err(ApiError::RateLimited);
        }
        if submission.match_type == MatchType::Duo
            && submission.partner_name.as_deref().is_none_or(|p| p.trim().is_empty())
        {
            return Err(ApiError::Rejected("duo score without a partner".into()));
        }

        let name = submission.display_name();
        let board = self.scores.board_mut(submission.match_type);
        let ranked = board.submit(&name, submission.score, now_ms);
        let high_score = board.best_for(&name).unwrap_or(0).max(submission.score);

        // Solo ranks are drawn from a wider simulated population
        let rank = match submission.match_type {
            MatchType::Solo => Some(self.rng.random_range(1..=100)),
            _ => ranked,
        };

        if self.persist {
            self.scores.save();
        }
        log::info!(
            "Score {} submitted to {} for {} (best {})",
            submission.score,
            submission.match_type.as_str(),
            name,
            high_score
        );

        Ok(ScoreResponse {
            success: true,
            high_score,
            rank,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> PlayerProfile {
        PlayerProfile {
            username: name.to_string(),
            ..PlayerProfile::default()
        }
    }

    #[test]
    fn test_rate_limit_per_key() {
        let mut limiter = RateLimiter::new(3000.0);
        assert!(limiter.check("a", 0.0));
        assert!(!limiter.check("a", 2999.0));
        assert!(limiter.check("b", 2999.0));
        assert!(limiter.check("a", 3000.0));
    }

    #[test]
    fn test_mock_keeps_best() {
        let mut api = MockScoreApi::new(5);
        let first = api.submit_score(&ScoreSubmission::solo(300, &profile("ann")), 0.0).unwrap();
        assert!(first.success);
        assert_eq!(first.high_score, 300);
        let rank = first.rank.unwrap();
        assert!((1..=100).contains(&rank));

        let second = api.submit_score(&ScoreSubmission::solo(100, &profile("ann")), 5000.0).unwrap();
        assert_eq!(second.high_score, 300);
    }

    #[test]
    fn test_mock_rate_limited() {
        let mut api = MockScoreApi::new(5);
        let sub = ScoreSubmission::solo(10, &profile("ann"));
        api.submit_score(&sub, 1000.0).unwrap();
        assert!(matches!(api.submit_score(&sub, 2000.0), Err(ApiError::RateLimited)));
    }

    #[test]
    fn test_duo_and_bot_buckets() {
        let mut api = MockScoreApi::new(5);
        let duo = ScoreSubmission::duo(700, &profile("ann"), "Rex");
        assert_eq!(duo.display_name(), "ann + Rex");
        let res = api.submit_score(&duo, 0.0).unwrap();
        assert_eq!(res.rank, Some(1));
        assert_eq!(api.scores().duo.best_for("ann + Rex"), Some(700));

        let bot = ScoreSubmission::vs_bot(90, &profile(""));
        assert_eq!(bot.display_name(), "You");
        api.submit_score(&bot, 10_000.0).unwrap();
        assert_eq!(api.scores().solo_bot.best_for("You"), Some(90));
        assert!(api.scores().solo.is_empty());
    }

    #[test]
    fn test_duo_without_partner_rejected() {
        let mut api = MockScoreApi::new(5);
        let mut duo = ScoreSubmission::duo(700, &profile("ann"), "Rex");
        duo.partner_name = None;
        assert!(matches!(api.submit_score(&duo, 0.0), Err(ApiError::Rejected(_))));
        assert!(api.scores().duo.is_empty());
    }

    #[test]
    fn test_submission_json() {
        let mut p = profile("ann");
        p.user_id = "ABC123".into();
        let json = serde_json::to_value(ScoreSubmission::duo(5, &p, "Rex")).unwrap();
        assert_eq!(json["type"], "duo");
        assert_eq!(json["partnerName"], "Rex");
        assert_eq!(json["userId"], "ABC123");
    }
}
