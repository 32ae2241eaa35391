//! High score leaderboards
//!
//! One top-10 board per game, persisted together under a single key.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};

/// Maximum number of entries kept per board
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Distance for the runner, accuracy percentage for tiles
    pub metric: f32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Top scores for one game, sorted descending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score if it qualifies and return its rank
    pub fn add_score(&mut self, score: u64, metric: f32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                metric,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Leaderboards for both games
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScores {
    pub runner: Leaderboard,
    pub tiles: Leaderboard,
}

impl HighScores {
    pub const STORAGE_KEY: &'static str = "donut_highscores";

    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<HighScores>(store, Self::STORAGE_KEY) {
            Some(mut scores) => {
                // Stored boards may come from an older build with other limits
                for board in [&mut scores.runner, &mut scores.tiles] {
                    board.entries.sort_by(|a, b| b.score.cmp(&a.score));
                    board.entries.truncate(MAX_HIGH_SCORES);
                }
                log::info!(
                    "Loaded high scores ({} runner, {} tiles)",
                    scores.runner.entries.len(),
                    scores.tiles.entries.len()
                );
                scores
            }
            None => {
                log::info!("No high scores found, starting fresh");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("High scores saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_zero_never_qualifies() {
        let board = Leaderboard::default();
        assert!(!board.qualifies(0));
        assert_eq!(board.potential_rank(0), None);
    }

    #[test]
    fn test_sorted_insert_and_rank() {
        let mut board = Leaderboard::default();
        assert_eq!(board.add_score(500, 50.0, 1.0), Some(1));
        assert_eq!(board.add_score(900, 90.0, 2.0), Some(1));
        assert_eq!(board.add_score(700, 70.0, 3.0), Some(2));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![900, 700, 500]);
        assert_eq!(board.top_score(), Some(900));
    }

    #[test]
    fn test_full_board_drops_lowest() {
        let mut board = Leaderboard::default();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            board.add_score(i * 100, 0.0, 0.0);
        }
        assert!(!board.qualifies(100));
        assert_eq!(board.add_score(50, 0.0, 0.0), None);
        assert_eq!(board.add_score(150, 0.0, 0.0), Some(MAX_HIGH_SCORES));
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(150));
    }

    #[test]
    fn test_round_trip_through_store() {
        let mut store = MemoryStore::default();
        let mut scores = HighScores::default();
        scores.runner.add_score(1234, 456.5, 10.0);
        scores.tiles.add_score(4200, 97.5, 11.0);
        scores.save(&mut store).unwrap();
        assert_eq!(HighScores::load(&store), scores);
    }

    #[test]
    fn test_corrupt_store_gives_empty_boards() {
        let mut store = MemoryStore::default();
        store.set(HighScores::STORAGE_KEY, "[1, 2").unwrap();
        let scores = HighScores::load(&store);
        assert!(scores.runner.is_empty());
        assert!(scores.tiles.is_empty());
    }
}
