//! Tapfall - A stage-based falling-object tap game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (stages, spawning, clock, engine state machine)
//! - `progression`: Stage unlocks derived from a persisted high score
//! - `highscores`: Leaderboard model
//! - `persistence`: Score storage contract and backends
//! - `settings`: Data-driven game balance and policies

pub mod highscores;
pub mod persistence;
pub mod progression;
pub mod settings;
pub mod sim;

pub use highscores::{HighScores, LeaderboardEntry};
pub use progression::{newly_unlocked, unlocked_levels};
pub use settings::{ConfigError, GameConfig, KindPolicy, SpawnOdds, StartScorePolicy};
pub use sim::{GameEngine, GameEvent, GamePhase, GameState, StageCatalog};

/// Default playfield and timing constants
pub mod consts {
    /// Reference screen width (logical pixels)
    pub const SCREEN_WIDTH: f32 = 375.0;
    /// Reference screen height (logical pixels)
    pub const SCREEN_HEIGHT: f32 = 812.0;
    /// Playable area is the top 80% of the screen
    pub const GAME_AREA_HEIGHT: f32 = SCREEN_HEIGHT * 0.8;
    /// Objects below this line are lost
    pub const DANGER_LINE_Y: f32 = GAME_AREA_HEIGHT - 80.0;
    /// Rendered diameter of a falling object
    pub const OBJECT_DIAMETER: f32 = 60.0;

    /// Starting and maximum lives
    pub const MAX_LIVES: u8 = 3;

    /// Fall distance per frame before the stage speed modifier
    pub const BASE_FALL_SPEED: f32 = 2.5;
    /// Position update cadence (ms)
    pub const FRAME_INTERVAL_MS: f64 = 50.0;
    /// Spawn cadence before the stage spawn modifier (ms)
    pub const BASE_SPAWN_INTERVAL_MS: f64 = 750.0;
    /// Spawn cadence floor (ms)
    pub const MIN_SPAWN_INTERVAL_MS: f64 = 150.0;

    /// Largest host frame delta accepted by a single update (ms)
    pub const MAX_UPDATE_DELTA_MS: f64 = 250.0;
    /// Maximum firings per trigger per update to prevent spiral of death
    pub const MAX_FIRES_PER_UPDATE: u32 = 8;
    /// Undrained engine events kept before the oldest are dropped
    pub const MAX_PENDING_EVENTS: usize = 256;
}
