//! Game balance and rule policies
//!
//! Everything tunable lives here so balancing never touches control flow.
//! Persisted as JSON next to the score store.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::ObjectKind;

/// Score a session starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StartScorePolicy {
    /// Every stage starts from zero
    #[default]
    Zero,
    /// Resume progress at the stage's unlock threshold
    StageThreshold,
}

/// Life costs for one object kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindPolicy {
    /// Lives lost when the player taps the object
    pub tap_life_cost: u8,
    /// Lives lost when the object crosses the danger line
    pub expiry_life_cost: u8,
}

/// Per-kind life cost table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindPolicies {
    pub normal: KindPolicy,
    pub golden: KindPolicy,
    pub bomb: KindPolicy,
}

impl Default for KindPolicies {
    fn default() -> Self {
        Self {
            normal: KindPolicy {
                tap_life_cost: 0,
                expiry_life_cost: 1,
            },
            golden: KindPolicy {
                tap_life_cost: 0,
                expiry_life_cost: 1,
            },
            // Dodging a bomb is free
            bomb: KindPolicy {
                tap_life_cost: 1,
                expiry_life_cost: 0,
            },
        }
    }
}

impl KindPolicies {
    pub fn get(&self, kind: ObjectKind) -> KindPolicy {
        match kind {
            ObjectKind::Normal => self.normal,
            ObjectKind::Golden => self.golden,
            ObjectKind::Bomb => self.bomb,
        }
    }
}

/// Spawn probabilities; whatever remains goes to the normal pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnOdds {
    pub golden: f64,
    pub bomb: f64,
}

impl Default for SpawnOdds {
    fn default() -> Self {
        Self {
            golden: 0.10,
            bomb: 0.30,
        }
    }
}

/// Rejected configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_lives must be between 1 and 3, got {0}")]
    Lives(u8),
    #[error("spawn odds must each lie in [0, 1] and sum to at most 1 (golden {golden}, bomb {bomb})")]
    Odds { golden: f64, bomb: f64 },
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Playfield ===
    pub screen_width: f32,
    pub danger_line_y: f32,
    pub object_diameter: f32,

    // === Timing ===
    /// Fall distance per frame before the stage modifier
    pub base_fall_speed: f32,
    pub frame_interval_ms: f64,
    pub base_spawn_interval_ms: f64,
    pub min_spawn_interval_ms: f64,

    // === Rules ===
    pub max_lives: u8,
    pub spawn_odds: SpawnOdds,
    pub start_score: StartScorePolicy,
    pub kind_policies: KindPolicies,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            danger_line_y: DANGER_LINE_Y,
            object_diameter: OBJECT_DIAMETER,

            base_fall_speed: BASE_FALL_SPEED,
            frame_interval_ms: FRAME_INTERVAL_MS,
            base_spawn_interval_ms: BASE_SPAWN_INTERVAL_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,

            max_lives: MAX_LIVES,
            spawn_odds: SpawnOdds::default(),
            start_score: StartScorePolicy::Zero,
            kind_policies: KindPolicies::default(),
        }
    }
}

impl GameConfig {
    /// Spawn cadence for a stage (ms)
    pub fn spawn_interval_ms(&self, spawn_rate_modifier: f32) -> f64 {
        (self.base_spawn_interval_ms / spawn_rate_modifier as f64).max(self.min_spawn_interval_ms)
    }

    /// Fall distance per frame for a stage
    pub fn fall_speed(&self, speed_modifier: f32) -> f32 {
        self.base_fall_speed * speed_modifier
    }

    /// Check the values the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LIVES).contains(&self.max_lives) {
            return Err(ConfigError::Lives(self.max_lives));
        }

        let SpawnOdds { golden, bomb } = self.spawn_odds;
        let in_unit = |p: f64| (0.0..=1.0).contains(&p);
        if !(in_unit(golden) && in_unit(bomb) && golden + bomb <= 1.0) {
            return Err(ConfigError::Odds { golden, bomb });
        }

        let positive = [
            ("screen_width", self.screen_width as f64),
            ("danger_line_y", self.danger_line_y as f64),
            ("object_diameter", self.object_diameter as f64),
            ("base_fall_speed", self.base_fall_speed as f64),
            ("frame_interval_ms", self.frame_interval_ms),
            ("base_spawn_interval_ms", self.base_spawn_interval_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
        ];
        for (name, value) in positive {
            // Also rejects NaN
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive(name));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if let Ok(json) = std::fs::read_to_string(path) {
            match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => log::warn!("Ignoring invalid config {}: {}", path.display(), e),
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}
