//! Score persistence
//!
//! Features:
//! - `PersistenceService` contract consumed by the game shell
//! - In-memory store (`ScoreStore`) and a JSON file backend
//! - Monotonic high score updates
//! - Session outcome recording that never rolls back game state

pub mod file;
pub mod outcome;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::{HighScores, LeaderboardEntry, now_ms};

pub use file::JsonFileStore;
pub use outcome::{SaveNotice, record_outcome};

/// How many leaderboard entries are consulted when ranking a user
pub const RANK_WINDOW: usize = 100;

/// Storage failures
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// A player's persisted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    pub username: String,
    pub high_score: u64,
    /// Unix timestamp (ms)
    pub created_at: f64,
}

impl UserRecord {
    pub fn new(user_id: &str, username: &str, high_score: u64) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: username.to_string(),
            high_score,
            created_at: now_ms(),
        }
    }
}

/// Storage contract for users and the leaderboard
pub trait PersistenceService {
    fn get_user_record(&self, user_id: &str) -> Result<Option<UserRecord>, PersistenceError>;

    fn create_user(&mut self, record: UserRecord) -> Result<(), PersistenceError>;

    /// Raise the stored high score; never lowers it
    fn update_high_score_if_greater(&mut self, user_id: &str, score: u64) -> Result<(), PersistenceError>;

    fn record_leaderboard_entry(
        &mut self,
        user_id: &str,
        username: &str,
        score: u64,
    ) -> Result<(), PersistenceError>;

    /// Best scores, highest first
    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError>;

    fn reset_all(&mut self) -> Result<(), PersistenceError>;

    /// 1-indexed leaderboard position of the user's high score; 0 when the user
    /// has no record or has never scored
    fn user_rank(&self, user_id: &str) -> Result<usize, PersistenceError> {
        let Some(user) = self.get_user_record(user_id)? else {
            return Ok(0);
        };
        if user.high_score == 0 {
            return Ok(0);
        }

        let entries = self.top_scores(RANK_WINDOW)?;
        Ok(HighScores { entries }.rank_of(user.high_score))
    }
}

/// In-memory users and leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreStore {
    pub users: BTreeMap<String, UserRecord>,
    pub leaderboard: HighScores,
    #[serde(default)]
    next_entry_id: u64,
}

impl ScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceService for ScoreStore {
    fn get_user_record(&self, user_id: &str) -> Result<Option<UserRecord>, PersistenceError> {
        Ok(self.users.get(user_id).cloned())
    }

    fn create_user(&mut self, record: UserRecord) -> Result<(), PersistenceError> {
        self.users.insert(record.user_id.clone(), record);
        Ok(())
    }

    fn update_high_score_if_greater(&mut self, user_id: &str, score: u64) -> Result<(), PersistenceError> {
        if let Some(user) = self.users.get_mut(user_id) {
            if score > user.high_score {
                log::info!("New high score for {}: {} -> {}", user_id, user.high_score, score);
                user.high_score = score;
            }
        }
        Ok(())
    }

    fn record_leaderboard_entry(
        &mut self,
        user_id: &str,
        username: &str,
        score: u64,
    ) -> Result<(), PersistenceError> {
        self.next_entry_id += 1;
        let entry = LeaderboardEntry {
            id: format!("entry-{}", self.next_entry_id),
            user_id: user_id.to_string(),
            username: username.to_string(),
            score,
            timestamp: now_ms(),
        };
        if let Some(rank) = self.leaderboard.add(entry) {
            log::info!("{} placed #{} with {}", username, rank, score);
        }
        Ok(())
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        Ok(self.leaderboard.top(limit).to_vec())
    }

    fn reset_all(&mut self) -> Result<(), PersistenceError> {
        *self = Self::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_score_is_monotonic() {
        let mut store = ScoreStore::new();
        store.create_user(UserRecord::new("u1", "ana", 500)).unwrap();

        store.update_high_score_if_greater("u1", 300).unwrap();
        assert_eq!(store.get_user_record("u1").unwrap().unwrap().high_score, 500);

        store.update_high_score_if_greater("u1", 900).unwrap();
        assert_eq!(store.get_user_record("u1").unwrap().unwrap().high_score, 900);
    }

    #[test]
    fn test_unknown_user() {
        let mut store = ScoreStore::new();
        assert!(store.get_user_record("ghost").unwrap().is_none());
        store.update_high_score_if_greater("ghost", 10).unwrap();
        assert!(store.users.is_empty());
        assert_eq!(store.user_rank("ghost").unwrap(), 0);
    }

    #[test]
    fn test_top_scores_ordered() {
        let mut store = ScoreStore::new();
        store.record_leaderboard_entry("u1", "ana", 100).unwrap();
        store.record_leaderboard_entry("u2", "bo", 400).unwrap();
        store.record_leaderboard_entry("u3", "cy", 250).unwrap();

        let top = store.top_scores(2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].username, "bo");
        assert_eq!(top[1].username, "cy");
        assert_ne!(top[0].id, top[1].id);
    }

    #[test]
    fn test_user_rank() {
        let mut store = ScoreStore::new();
        store.create_user(UserRecord::new("u1", "ana", 250)).unwrap();
        store.record_leaderboard_entry("u2", "bo", 400).unwrap();
        store.record_leaderboard_entry("u3", "cy", 100).unwrap();
        assert_eq!(store.user_rank("u1").unwrap(), 2);

        // Ties rank ahead of the existing entry
        store.create_user(UserRecord::new("u5", "ed", 400)).unwrap();
        assert_eq!(store.user_rank("u5").unwrap(), 1);

        store.create_user(UserRecord::new("u4", "di", 0)).unwrap();
        assert_eq!(store.user_rank("u4").unwrap(), 0);
    }

    #[test]
    fn test_reset_all() {
        let mut store = ScoreStore::new();
        store.create_user(UserRecord::new("u1", "ana", 250)).unwrap();
        store.record_leaderboard_entry("u1", "ana", 250).unwrap();
        store.reset_all().unwrap();
        assert_eq!(store, ScoreStore::new());
    }
}
