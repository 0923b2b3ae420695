//! High score leaderboard and stage progress
//!
//! Persisted to LocalStorage, tracks top 10 scores and the highest unlocked stage.

use serde::{Deserialize, Serialize};

use crate::sim::GameMode;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Mode the run was played in
    pub mode: GameMode,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard plus unlock state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
    /// Highest stage the player may select
    #[serde(default = "first_stage")]
    pub max_unlocked_stage: u32,
}

fn first_stage() -> u32 {
    1
}

impl Default for HighScores {
    fn default() -> Self {
        Self::new()
    }
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fruit_catcher_highscores";

    /// Create empty leaderboard with stage 1 unlocked
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_unlocked_stage: first_stage(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(
        &mut self,
        score: u64,
        level: u32,
        mode: GameMode,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            level,
            mode,
            timestamp,
        };

        // Sorted descending by score; ties keep the earlier run first
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Whether a stage can be selected
    pub fn is_unlocked(&self, stage: u32) -> bool {
        (1..=self.max_unlocked_stage).contains(&stage)
    }

    /// Clearing a stage unlocks the next one (up to `last_stage`).
    /// Returns true if a new stage became available.
    pub fn record_stage_clear(&mut self, stage: u32, last_stage: u32) -> bool {
        let next = (stage + 1).min(last_stage);
        if next > self.max_unlocked_stage {
            self.max_unlocked_stage = next;
            log::info!("Stage {} unlocked", next);
            true
        } else {
            false
        }
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<HighScores>(&json) {
                    Ok(scores) => {
                        log::info!("Loaded {} high scores", scores.entries.len());
                        return scores;
                    }
                    Err(err) => log::warn!("Discarding unreadable high scores: {err}"),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
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
