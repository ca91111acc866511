//! JSON file backend
//!
//! The whole store is rewritten on every mutation: written to a temp file,
//! then renamed over the save.

use std::path::{Path, PathBuf};

use super::{PersistenceError, PersistenceService, ScoreStore, UserRecord};
use crate::highscores::LeaderboardEntry;

/// Score store persisted to a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: ScoreStore,
}

impl JsonFileStore {
    /// Open a store, starting fresh if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(json) => {
                let data: ScoreStore = serde_json::from_str(&json)?;
                log::info!(
                    "Loaded {} users and {} scores from {}",
                    data.users.len(),
                    data.leaderboard.len(),
                    path.display()
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No score file at {}, starting fresh", path.display());
                ScoreStore::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Callers mutate `data` first; a failed flush leaves memory ahead of disk
    fn flush(&self) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Scores saved to {}", self.path.display());
        Ok(())
    }
}

impl PersistenceService for JsonFileStore {
    fn get_user_record(&self, user_id: &str) -> Result<Option<UserRecord>, PersistenceError> {
        self.data.get_user_record(user_id)
    }

    fn create_user(&mut self, record: UserRecord) -> Result<(), PersistenceError> {
        self.data.create_user(record)?;
        self.flush()
    }

    fn update_high_score_if_greater(&mut self, user_id: &str, score: u64) -> Result<(), PersistenceError> {
        self.data.update_high_score_if_greater(user_id, score)?;
        self.flush()
    }

    fn record_leaderboard_entry(
        &mut self,
        user_id: &str,
        username: &str,
        score: u64,
    ) -> Result<(), PersistenceError> {
        self.data.record_leaderboard_entry(user_id, username, score)?;
        self.flush()
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
        self.data.top_scores(limit)
    }

    fn reset_all(&mut self) -> Result<(), PersistenceError> {
        self.data.reset_all()?;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tapfall-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_reopen_keeps_data() {
        let path = temp_path("reopen");
        let _ = std::fs::remove_file(&path);

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.create_user(UserRecord::new("u1", "ana", 0)).unwrap();
            store.update_high_score_if_greater("u1", 1200).unwrap();
            store.record_leaderboard_entry("u1", "ana", 1200).unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_user_record("u1").unwrap().unwrap().high_score, 1200);
        assert_eq!(store.top_scores(10).unwrap().len(), 1);

        let mut store = store;
        store.reset_all().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(PersistenceError::Corrupt(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
