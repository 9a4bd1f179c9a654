//! Score leaderboard
//!
//! One row per user id; a new submission replaces that user's row. Rows are
//! kept sorted by score, highest first, and persisted through a `Storage`
//! backend.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::Storage;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub user_id: String,
    pub score: u64,
}

/// Remote-style score table: write one user's score, read the top rows
pub trait ScoreBoard {
    fn submit_score(&mut self, user_id: &str, score: u64) -> Result<()>;
    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>>;
}

/// In-memory leaderboard rows, highest score first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalLeaderboard {
    pub entries: Vec<ScoreEntry>,
}

impl LocalLeaderboard {
    const STORAGE_KEY: &'static str = "scores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// 1-indexed position of `user_id`
    pub fn rank_of(&self, user_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.user_id == user_id)
            .map(|i| i + 1)
    }

    pub fn score_of(&self, user_id: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.user_id == user_id)
            .map(|e| e.score)
    }

    /// Replace `user_id`'s row; returns the rank it lands on
    pub fn set_score(&mut self, user_id: &str, score: u64) -> usize {
        self.entries.retain(|e| e.user_id != user_id);

        // Ties keep the earlier row ahead
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            pos,
            ScoreEntry {
                user_id: user_id.to_string(),
                score,
            },
        );
        pos + 1
    }

    /// Load the table; a missing or unreadable table starts fresh
    pub fn load<S: Storage>(storage: &S) -> Self {
        match storage.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<LocalLeaderboard>(&json) {
                Ok(mut board) => {
                    board.entries.sort_by(|a, b| b.score.cmp(&a.score));
                    log::info!("Loaded {} leaderboard entries", board.entries.len());
                    return board;
                }
                Err(e) => log::warn!("Discarding malformed leaderboard: {e}"),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read leaderboard: {e}"),
        }

        log::info!("No leaderboard found, starting fresh");
        Self::new()
    }

    pub fn save<S: Storage>(&self, storage: &mut S) -> Result<()> {
        let json = serde_json::to_string(self)?;
        storage.set(Self::STORAGE_KEY, &json)?;
        log::debug!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// A leaderboard bound to the storage it persists into
#[derive(Debug, Clone)]
pub struct StoredLeaderboard<S: Storage> {
    board: LocalLeaderboard,
    storage: S,
}

impl<S: Storage> StoredLeaderboard<S> {
    pub fn open(storage: S) -> Self {
        Self {
            board: LocalLeaderboard::load(&storage),
            storage,
        }
    }

    pub fn board(&self) -> &LocalLeaderboard {
        &self.board
    }
}

impl<S: Storage> ScoreBoard for StoredLeaderboard<S> {
    /// The in-memory row is only replaced once the write succeeded
    fn submit_score(&mut self, user_id: &str, score: u64) -> Result<()> {
        let mut updated = self.board.clone();
        let rank = updated.set_score(user_id, score);
        updated.save(&mut self.storage)?;
        self.board = updated;
        log::info!("Score {score} submitted for {user_id} (rank {rank})");
        Ok(())
    }

    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>> {
        self.board.fetch_top_scores(limit)
    }
}

impl ScoreBoard for LocalLeaderboard {
    fn submit_score(&mut self, user_id: &str, score: u64) -> Result<()> {
        self.set_score(user_id, score);
        Ok(())
    }

    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<ScoreEntry>> {
        Ok(self.entries.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_sorted_descending() {
        let mut board = LocalLeaderboard::new();
        board.set_score("user_a", 10);
        board.set_score("user_b", 30);
        board.set_score("user_c", 20);

        let top = board.fetch_top_scores(10).unwrap();
        let scores: Vec<u64> = top.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![30, 20, 10]);
        assert_eq!(board.top_score(), Some(30));
        assert_eq!(board.rank_of("user_c"), Some(2));
    }

    #[test]
    fn test_submit_replaces_user_row() {
        let mut board = LocalLeaderboard::new();
        board.submit_score("user_a", 50).unwrap();
        board.submit_score("user_b", 40).unwrap();
        board.submit_score("user_a", 5).unwrap();

        assert_eq!(board.len(), 2);
        assert_eq!(board.score_of("user_a"), Some(5));
        assert_eq!(board.rank_of("user_a"), Some(2));
    }

    #[test]
    fn test_fetch_respects_limit() {
        let mut board = LocalLeaderboard::new();
        for i in 0..15 {
            board.set_score(&format!("user_{i}"), i * 10);
        }
        let top = board.fetch_top_scores(10).unwrap();
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].score, 140);
        assert_eq!(top[9].score, 50);
    }

    #[test]
    fn test_ties_keep_first_submitter_ahead() {
        let mut board = LocalLeaderboard::new();
        board.set_score("user_a", 10);
        assert_eq!(board.set_score("user_b", 10), 2);
    }

    #[test]
    fn test_stored_board_persists() {
        let mut board = StoredLeaderboard::open(MemoryStorage::new());
        board.submit_score("user_a", 12).unwrap();

        let reopened = StoredLeaderboard::open(board.storage.clone());
        assert_eq!(reopened.board().score_of("user_a"), Some(12));
    }

    #[test]
    fn test_failed_submit_leaves_board_untouched() {
        let mut board = StoredLeaderboard::open(MemoryStorage::failing());
        assert!(matches!(
            board.submit_score("user_a", 12),
            Err(GameError::Unavailable(_))
        ));
        assert!(board.board().is_empty());
    }

    #[test]
    fn test_malformed_table_starts_fresh() {
        let mut storage = MemoryStorage::new();
        storage.set("scores", "not json").unwrap();
        assert!(LocalLeaderboard::load(&storage).is_empty());
    }
}
