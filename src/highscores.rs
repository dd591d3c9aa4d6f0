//! High score leaderboards
//!
//! One board per match bucket (solo, duo, solo vs bot), each keeping the top
//! 10 players with their personal best. Persisted to LocalStorage.

use serde::{Deserialize, Serialize};

use crate::api::MatchType;

/// Maximum number of entries per board
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Display name (or "name + partner" for duo)
    pub name: String,
    pub score: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Top scores for one bucket, sorted descending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Personal best for a name, if on the board
    pub fn best_for(&self, name: &str) -> Option<u64> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.score)
    }

    /// Check if a score would put this name on the board or raise its best
    pub fn qualifies(&self, name: &str, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if let Some(best) = self.best_for(name) {
            return score > best;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a score. A name keeps a single entry holding its best.
    /// Returns the (1-indexed) rank of the name after the update, if ranked.
    pub fn submit(&mut self, name: &str, score: u64, timestamp: f64) -> Option<usize> {
        if self.qualifies(name, score) {
            self.entries.retain(|e| e.name != name);
            let entry = HighScoreEntry {
                name: name.to_string(),
                score,
                timestamp,
            };
            // Ties keep the earlier holder ahead
            let pos = self.entries.iter().position(|e| score > e.score);
            match pos {
                Some(i) => self.entries.insert(i, entry),
                None => self.entries.push(entry),
            }
            self.entries.truncate(MAX_HIGH_SCORES);
        }
        self.rank_of(name)
    }

    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// All leaderboards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScores {
    pub solo: Leaderboard,
    pub duo: Leaderboard,
    pub solo_bot: Leaderboard,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "dragon_egg_leaderboards";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self, match_type: MatchType) -> &Leaderboard {
        match match_type {
            MatchType::Solo => &self.solo,
            MatchType::Duo => &self.duo,
            MatchType::SoloBot => &self.solo_bot,
        }
    }

    pub fn board_mut(&mut self, match_type: MatchType) -> &mut Leaderboard {
        match match_type {
            MatchType::Solo => &mut self.solo,
            MatchType::Duo => &mut self.duo,
            MatchType::SoloBot => &mut self.solo_bot,
        }
    }

    /// Load leaderboards from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!(
                        "Loaded leaderboards ({} solo, {} duo, {} vs bot)",
                        scores.solo.entries.len(),
                        scores.duo.entries.len(),
                        scores.solo_bot.entries.len()
                    );
                    return scores;
                }
            }
        }

        log::info!("No leaderboards found, starting fresh");
        Self::new()
    }

    /// Save leaderboards to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::debug!("Leaderboards saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_entry_per_name() {
        let mut board = Leaderboard::new();
        assert_eq!(board.submit("ann", 100, 1.0), Some(1));
        assert_eq!(board.submit("bob", 300, 2.0), Some(1));
        assert_eq!(board.rank_of("ann"), Some(2));

        // Lower score keeps the best
        assert_eq!(board.submit("bob", 50, 3.0), Some(1));
        assert_eq!(board.best_for("bob"), Some(300));
        assert_eq!(board.entries.len(), 2);

        assert_eq!(board.submit("ann", 500, 4.0), Some(1));
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.top_score(), Some(500));
    }

    #[test]
    fn test_board_is_capped() {
        let mut board = Leaderboard::new();
        for i in 0..MAX_HIGH_SCORES as u64 {
            board.submit(&format!("p{i}"), (i + 1) * 10, 0.0);
        }
        assert!(!board.qualifies("late", 5));
        assert_eq!(board.submit("late", 5, 0.0), None);
        assert_eq!(board.submit("late", 1000, 0.0), Some(1));
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.rank_of("p0"), None);
    }

    #[test]
    fn test_zero_never_ranks() {
        let mut board = Leaderboard::new();
        assert_eq!(board.submit("ann", 0, 0.0), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_buckets_are_separate() {
        let mut scores = HighScores::new();
        scores.board_mut(MatchType::Duo).submit("ann + bob", 40, 0.0);
        assert!(scores.board(MatchType::Solo).is_empty());
        assert_eq!(scores.board(MatchType::Duo).top_score(), Some(40));

        let json = serde_json::to_string(&scores).unwrap();
        let back: HighScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scores);
    }
}
