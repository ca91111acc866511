//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time enters only through the simulation clock
//! - Seeded RNG only
//! - Stable iteration order (by object ID)
//! - No rendering, storage or platform dependencies

pub mod clock;
pub mod engine;
pub mod spawner;
pub mod stage;
pub mod state;

pub use clock::{ClockTick, SimulationClock, Trigger};
pub use engine::GameEngine;
pub use spawner::ObjectFactory;
pub use stage::{
    CatalogError, ObjectKind, ObjectPool, ObjectTemplate, StageCatalog, StageDefinition, VisualKey,
};
pub use state::{FallingObject, GameEvent, GamePhase, GameState, ObjectId, RngState};
