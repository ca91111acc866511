//! Records a finished session through a `PersistenceService`

use super::{PersistenceError, PersistenceService, UserRecord};
use crate::sim::{GamePhase, GameState};

/// Name stored for players without a record
pub const DEFAULT_USERNAME: &str = "Player";

/// Non-blocking "could not save" notification for the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveNotice {
    pub message: String,
}

impl From<PersistenceError> for SaveNotice {
    fn from(err: PersistenceError) -> Self {
        Self {
            message: format!("Could not save your score: {}", err),
        }
    }
}

/// Save the outcome of a finished session.
///
/// Only acts on stage complete, game complete and game over. Raises the
/// user's high score, appends a leaderboard entry and creates the user on
/// first play. Failures come back as a notice; the game state is untouched.
pub fn record_outcome<S: PersistenceService + ?Sized>(
    service: &mut S,
    user_id: &str,
    state: &GameState,
) -> Option<SaveNotice> {
    match state.phase() {
        GamePhase::StageComplete | GamePhase::GameComplete | GamePhase::GameOver => {}
        _ => return None,
    }

    match save(service, user_id, state.score) {
        Ok(()) => None,
        Err(e) => {
            log::warn!("Failed to save session for {}: {}", user_id, e);
            Some(e.into())
        }
    }
}

fn save<S: PersistenceService + ?Sized>(
    service: &mut S,
    user_id: &str,
    score: u64,
) -> Result<(), PersistenceError> {
    let user = service.get_user_record(user_id)?;
    let username = user
        .as_ref()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());

    service.update_high_score_if_greater(user_id, score)?;
    service.record_leaderboard_entry(user_id, &username, score)?;

    if user.is_none() {
        service.create_user(UserRecord::new(user_id, &username, score))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::LeaderboardEntry;
    use crate::persistence::ScoreStore;

    /// Backend that is always offline
    struct Offline;

    impl PersistenceService for Offline {
        fn get_user_record(&self, _: &str) -> Result<Option<UserRecord>, PersistenceError> {
            Err(PersistenceError::Unavailable("offline".into()))
        }
        fn create_user(&mut self, _: UserRecord) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("offline".into()))
        }
        fn update_high_score_if_greater(&mut self, _: &str, _: u64) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("offline".into()))
        }
        fn record_leaderboard_entry(&mut self, _: &str, _: &str, _: u64) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("offline".into()))
        }
        fn top_scores(&self, _: usize) -> Result<Vec<LeaderboardEntry>, PersistenceError> {
            Err(PersistenceError::Unavailable("offline".into()))
        }
        fn reset_all(&mut self) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    fn game_over(score: u64) -> GameState {
        let mut state = GameState::new(1, 0);
        state.score = score;
        state.is_game_over = true;
        state
    }

    #[test]
    fn test_first_session_creates_user() {
        let mut store = ScoreStore::new();
        assert!(record_outcome(&mut store, "u1", &game_over(420)).is_none());

        let user = store.get_user_record("u1").unwrap().unwrap();
        assert_eq!(user.username, DEFAULT_USERNAME);
        assert_eq!(user.high_score, 420);
        assert_eq!(store.top_scores(10).unwrap().len(), 1);
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let mut store = ScoreStore::new();
        store.create_user(UserRecord::new("u1", "ana", 900)).unwrap();
        record_outcome(&mut store, "u1", &game_over(300));

        assert_eq!(store.get_user_record("u1").unwrap().unwrap().high_score, 900);
        assert_eq!(store.top_scores(10).unwrap()[0].username, "ana");
    }

    #[test]
    fn test_running_session_is_not_recorded() {
        let mut store = ScoreStore::new();
        let mut state = GameState::new(1, 3);
        state.is_playing = true;
        assert!(record_outcome(&mut store, "u1", &state).is_none());
        assert!(store.users.is_empty());
    }

    #[test]
    fn test_failure_becomes_notice() {
        let state = game_over(500);
        let notice = record_outcome(&mut Offline, "u1", &state).expect("notice");
        assert!(notice.message.contains("offline"));
        assert_eq!(state.score, 500);
    }
}
