//! Game engine: the authoritative state machine
//!
//! Every mutation goes through a command method and runs to completion before
//! the next one. Commands issued in the wrong phase are silent no-ops.

use std::collections::VecDeque;

use rand_pcg::Pcg32;

use super::clock::{ClockTick, SimulationClock};
use super::spawner::ObjectFactory;
use super::stage::{ObjectTemplate, StageCatalog, StageDefinition};
use super::state::{FallingObject, GameEvent, GamePhase, GameState, ObjectId, RngState};
use crate::consts::MAX_PENDING_EVENTS;
use crate::settings::{GameConfig, StartScorePolicy};
use glam::Vec2;

/// Owns the game state, its clock and its RNG
#[derive(Debug, Clone)]
pub struct GameEngine {
    catalog: StageCatalog,
    config: GameConfig,
    factory: ObjectFactory,
    clock: SimulationClock,
    state: GameState,
    rng_state: RngState,
    rng: Pcg32,
    next_id: u64,
    /// Oldest entries are dropped once `MAX_PENDING_EVENTS` are queued
    events: VecDeque<GameEvent>,
}

impl GameEngine {
    /// Create an idle engine over a validated catalog
    pub fn new(catalog: StageCatalog, config: GameConfig, seed: u64) -> Self {
        let factory = ObjectFactory::new(config.spawn_odds, config.screen_width, config.object_diameter);
        let state = GameState::new(catalog.first().level, config.max_lives);
        let rng_state = RngState::new(seed);
        let rng = rng_state.to_rng();

        Self {
            catalog,
            config,
            factory,
            clock: SimulationClock::new(),
            state,
            rng_state,
            rng,
            next_id: 1,
            events: VecDeque::new(),
        }
    }

    /// Bundled stages with default tuning
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(StageCatalog::default_stages(), GameConfig::default(), seed)
    }

    // === Queries ===

    /// Immutable snapshot of the current state
    pub fn current_state(&self) -> GameState {
        self.state.clone()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Drain events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    fn emit(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn stage(&self) -> &StageDefinition {
        stage_of(&self.catalog, self.state.current_stage)
    }

    // === Lifecycle commands ===

    /// Begin a fresh session on `level`. Unknown levels are ignored.
    pub fn start(&mut self, level: u32) -> &GameState {
        let Some(stage) = self.catalog.by_level(level) else {
            log::warn!("Ignoring start on unknown stage {}", level);
            return &self.state;
        };

        let score = match self.config.start_score {
            StartScorePolicy::Zero => 0,
            StartScorePolicy::StageThreshold => stage.score_threshold,
        };
        let spawn_ms = self.config.spawn_interval_ms(stage.spawn_rate_modifier);

        self.state = GameState {
            score,
            lives: self.config.max_lives,
            is_playing: true,
            is_paused: false,
            is_game_over: false,
            is_stage_complete: false,
            is_game_complete: false,
            objects: Vec::new(),
            current_stage: level,
        };
        self.clock.start(self.config.frame_interval_ms, spawn_ms);

        log::info!("Stage {} ({}) started, score {}", level, stage.name, score);
        self.emit(GameEvent::Started { stage: level });
        &self.state
    }

    /// Start the stage after the current one, if there is one
    pub fn start_next_stage(&mut self) -> &GameState {
        match self.catalog.next(self.state.current_stage).map(|s| s.level) {
            Some(level) => self.start(level),
            None => &self.state,
        }
    }

    pub fn pause(&mut self) -> &GameState {
        if self.state.is_active() {
            self.state.is_paused = true;
            self.clock.stop();
            log::info!("Paused");
        }
        &self.state
    }

    pub fn resume(&mut self) -> &GameState {
        if self.state.phase() == GamePhase::Paused {
            self.state.is_paused = false;
            let spawn_ms = self.config.spawn_interval_ms(self.stage().spawn_rate_modifier);
            self.clock.start(self.config.frame_interval_ms, spawn_ms);
            log::info!("Resumed");
        }
        &self.state
    }

    /// Back to idle on the first stage
    pub fn reset(&mut self) -> &GameState {
        self.clock.stop();
        self.state = GameState::new(self.catalog.first().level, self.config.max_lives);
        log::info!("Game reset");
        &self.state
    }

    /// Cancel timers unconditionally (host going away)
    pub fn teardown(&mut self) {
        self.clock.stop();
    }

    // === Simulation commands ===

    /// Feed host time; runs whatever frame/spawn ticks fall due
    pub fn update(&mut self, dt_ms: f64) -> &GameState {
        if !self.state.is_active() {
            return &self.state;
        }

        for tick in self.clock.advance(dt_ms) {
            // A tick may end the session; drop the rest
            if !self.state.is_active() {
                break;
            }
            match tick {
                ClockTick::Frame => {
                    self.advance_frame();
                }
                ClockTick::Spawn => {
                    self.spawn();
                }
            }
        }
        &self.state
    }

    /// Add one random object from the current stage's pool
    pub fn spawn(&mut self) -> &GameState {
        if !self.state.is_active() {
            return &self.state;
        }

        let id = self.allocate_id();
        let stage = stage_of(&self.catalog, self.state.current_stage);
        let object = self.factory.create_random(stage, id, &mut self.rng);
        self.push_object(object);
        &self.state
    }

    /// Add a specific object at horizontal position `x` (scripted spawns)
    pub fn spawn_template(&mut self, template: &ObjectTemplate, x: f32) -> Option<ObjectId> {
        if !self.state.is_active() {
            return None;
        }

        let max_x = (self.config.screen_width - self.config.object_diameter).max(0.0);
        let id = self.allocate_id();
        self.push_object(FallingObject {
            id,
            pos: Vec2::new(x.clamp(0.0, max_x), 0.0),
            kind: template.kind,
            points: template.points,
            visual: template.visual.clone(),
        });
        Some(id)
    }

    /// Move every object down one frame and resolve danger-line crossings
    pub fn advance_frame(&mut self) -> &GameState {
        if !self.state.is_active() {
            return &self.state;
        }

        let speed = self.config.fall_speed(self.stage().speed_modifier);
        let danger_y = self.config.danger_line_y;
        let policies = self.config.kind_policies;

        let mut lives_lost: u32 = 0;
        let mut missed = Vec::new();
        self.state.objects.retain_mut(|obj| {
            obj.pos.y += speed;
            if !obj.is_past(danger_y) {
                return true;
            }
            let cost = policies.get(obj.kind).expiry_life_cost;
            lives_lost += cost as u32;
            missed.push(GameEvent::Missed {
                id: obj.id,
                kind: obj.kind,
                lives_lost: cost,
            });
            false
        });

        for event in missed {
            log::debug!("{:?}", event);
            self.emit(event);
        }

        if lives_lost > 0 {
            let lives = (self.state.lives as u32).saturating_sub(lives_lost);
            self.state.lives = lives as u8;
            if lives == 0 {
                self.game_over();
            }
        }
        &self.state
    }

    /// Resolve a tap on object `id`
    pub fn tap(&mut self, id: ObjectId) -> &GameState {
        if !self.state.is_active() {
            return &self.state;
        }

        let danger_y = self.config.danger_line_y;
        let Some(index) = self
            .state
            .objects
            .iter()
            .position(|o| o.id == id && !o.is_past(danger_y))
        else {
            return &self.state;
        };

        let object = self.state.objects.remove(index);
        let new_score = GameState::apply_points(self.state.score, object.points);
        log::debug!("Tapped {} ({}) for {}", object.id, object.kind.as_str(), object.points);
        self.emit(GameEvent::Tapped {
            id: object.id,
            kind: object.kind,
            points: object.points,
        });

        // Completion checks win over bomb penalties; game completion over stage advance
        let stage = self.stage();
        let completes_game = stage.completion_score.is_some_and(|target| new_score >= target);
        let completes_stage = self
            .catalog
            .next(stage.level)
            .is_some_and(|next| new_score >= next.score_threshold);

        self.state.score = new_score;

        if completes_game {
            self.finish_stage(true);
        } else if completes_stage {
            self.finish_stage(false);
        } else {
            let cost = self.config.kind_policies.get(object.kind).tap_life_cost;
            if cost > 0 {
                self.state.lives = self.state.lives.saturating_sub(cost);
                if self.state.lives == 0 {
                    self.game_over();
                }
            }
        }
        &self.state
    }

    // === Transitions ===

    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_object(&mut self, object: FallingObject) {
        log::debug!("Spawned {} ({}) at x={:.1}", object.id, object.kind.as_str(), object.pos.x);
        self.emit(GameEvent::Spawned {
            id: object.id,
            kind: object.kind,
        });
        self.state.objects.push(object);
    }

    fn finish_stage(&mut self, final_stage: bool) {
        self.clock.stop();
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.state.is_stage_complete = true;
        self.state.objects.clear();

        let score = self.state.score;
        let stage = self.state.current_stage;
        if final_stage {
            self.state.is_game_complete = true;
            log::info!("Game complete with score {}", score);
            self.emit(GameEvent::GameComplete { score });
        } else {
            log::info!("Stage {} complete with score {}", stage, score);
            self.emit(GameEvent::StageComplete { stage, score });
        }
    }

    fn game_over(&mut self) {
        self.clock.stop();
        self.state.lives = 0;
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.state.is_game_over = true;

        log::info!("Game over on stage {} with score {}", self.state.current_stage, self.state.score);
        self.emit(GameEvent::GameOver {
            stage: self.state.current_stage,
            score: self.state.score,
        });
    }
}

/// current_stage is only ever set from catalog levels
fn stage_of(catalog: &StageCatalog, level: u32) -> &StageDefinition {
    catalog.by_level(level).unwrap_or_else(|| catalog.first())
}
