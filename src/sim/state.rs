//! Game state and core simulation types
//!
//! `GameState` is the single source of truth. It is owned by the engine and
//! handed out only as snapshots.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::stage::{ObjectKind, VisualKey};

/// Conceptual phase, derived from the state flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No session running
    Idle,
    /// Active gameplay
    Playing,
    /// Session frozen, timers stopped
    Paused,
    /// Next-stage threshold reached
    StageComplete,
    /// Final stage completion score reached
    GameComplete,
    /// Out of lives
    GameOver,
}

/// Unique id of a falling object within an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// A live falling object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingObject {
    pub id: ObjectId,
    /// Top-left corner; y grows downward
    pub pos: Vec2,
    pub kind: ObjectKind,
    pub points: i64,
    pub visual: VisualKey,
}

impl FallingObject {
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pos.y
    }

    /// True once the object has crossed the danger line
    pub fn is_past(&self, danger_line_y: f32) -> bool {
        self.pos.y > danger_line_y
    }
}

/// Notable things that happened during a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started { stage: u32 },
    Spawned { id: ObjectId, kind: ObjectKind },
    Tapped { id: ObjectId, kind: ObjectKind, points: i64 },
    Missed { id: ObjectId, kind: ObjectKind, lives_lost: u8 },
    StageComplete { stage: u32, score: u64 },
    GameComplete { score: u64 },
    GameOver { stage: u32, score: u64 },
}

impl GameEvent {
    /// Whether this event ends the session
    pub fn is_session_end(&self) -> bool {
        matches!(
            self,
            GameEvent::StageComplete { .. } | GameEvent::GameComplete { .. } | GameEvent::GameOver { .. }
        )
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Never negative, penalties clamp at zero
    pub score: u64,
    pub lives: u8,
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_game_over: bool,
    pub is_stage_complete: bool,
    pub is_game_complete: bool,
    /// Live objects in spawn (id) order
    pub objects: Vec<FallingObject>,
    pub current_stage: u32,
}

impl GameState {
    /// Fresh idle state on the given stage
    pub fn new(first_stage: u32, lives: u8) -> Self {
        Self {
            score: 0,
            lives,
            is_playing: false,
            is_paused: false,
            is_game_over: false,
            is_stage_complete: false,
            is_game_complete: false,
            objects: Vec::new(),
            current_stage: first_stage,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_game_complete {
            GamePhase::GameComplete
        } else if self.is_game_over {
            GamePhase::GameOver
        } else if self.is_stage_complete {
            GamePhase::StageComplete
        } else if self.is_playing && self.is_paused {
            GamePhase::Paused
        } else if self.is_playing {
            GamePhase::Playing
        } else {
            GamePhase::Idle
        }
    }

    /// Playing and not paused: the only phase that accepts simulation commands
    pub fn is_active(&self) -> bool {
        self.is_playing && !self.is_paused
    }

    pub fn object(&self, id: ObjectId) -> Option<&FallingObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Apply a signed point delta, clamping at zero
    pub fn apply_points(score: u64, points: i64) -> u64 {
        if points >= 0 {
            score.saturating_add(points as u64)
        } else {
            score.saturating_sub(points.unsigned_abs())
        }
    }
}
