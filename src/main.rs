//! Tapfall headless runner
//!
//! Plays an autopilot session against the engine, driving it through the
//! simulation clock, and records each finished stage in the score file.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use tapfall::highscores::now_ms;
    use tapfall::persistence::{JsonFileStore, PersistenceService, ScoreStore, record_outcome};
    use tapfall::sim::{GameEngine, GameEvent, GamePhase, ObjectKind, StageCatalog};
    use tapfall::{GameConfig, newly_unlocked, unlocked_levels};

    const CONFIG_PATH: &str = "tapfall-config.json";
    const SCORES_PATH: &str = "tapfall-scores.json";
    const USER_ID: &str = "local";

    /// Host frame length (ms)
    const HOST_FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after this much simulated time per stage (ms)
    const STAGE_TIME_LIMIT_MS: f64 = 5.0 * 60.0 * 1000.0;
    /// Autopilot waits this long between taps (ms)
    const REACTION_MS: f64 = 180.0;
    /// Autopilot only taps objects this far down toward the danger line
    const TAP_DEPTH: f32 = 0.6;

    pub fn run() {
        env_logger::init();
        log::info!("Tapfall (headless) starting...");

        let config = GameConfig::load_from(Path::new(CONFIG_PATH));
        let mut store: Box<dyn PersistenceService> = match JsonFileStore::open(SCORES_PATH) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("Score file unavailable ({}), scores will not persist", e);
                Box::new(ScoreStore::new())
            }
        };

        let high_before = store
            .get_user_record(USER_ID)
            .ok()
            .flatten()
            .map(|u| u.high_score)
            .unwrap_or(0);

        let catalog = StageCatalog::default_stages();
        let unlocked = unlocked_levels(&catalog, high_before);
        let start_level = unlocked.iter().next_back().copied().unwrap_or(1);
        log::info!("High score {}, unlocked stages {:?}", high_before, unlocked);

        let seed = now_ms() as u64;
        let mut engine = GameEngine::new(catalog, config, seed);
        log::info!("Game initialized with seed: {}", seed);

        engine.start(start_level);
        let mut best = 0;
        loop {
            let finished = play_stage(&mut engine);
            best = best.max(engine.state().score);

            if let Some(notice) = record_outcome(store.as_mut(), USER_ID, engine.state()) {
                println!("{}", notice.message);
            }

            match finished {
                Some(GamePhase::StageComplete) => {
                    println!(
                        "Stage {} cleared with {} points",
                        engine.state().current_stage,
                        engine.state().score
                    );
                    engine.start_next_stage();
                }
                Some(GamePhase::GameComplete) => {
                    println!("All stages complete! Final score {}", engine.state().score);
                    break;
                }
                Some(GamePhase::GameOver) => {
                    println!(
                        "Game over on stage {} with {} points",
                        engine.state().current_stage,
                        engine.state().score
                    );
                    break;
                }
                _ => {
                    println!("Time limit reached on stage {}", engine.state().current_stage);
                    break;
                }
            }
        }
        engine.teardown();

        let opened = newly_unlocked(engine.catalog(), high_before, best);
        if !opened.is_empty() {
            println!("New stages unlocked: {:?}", opened);
        }
        if let Ok(top) = store.top_scores(5) {
            println!("\nTop scores:");
            for (i, entry) in top.iter().enumerate() {
                println!("{:>2}. {:<12} {}", i + 1, entry.username, entry.score);
            }
        }
    }

    /// Run the current stage until it ends or times out
    fn play_stage(engine: &mut GameEngine) -> Option<GamePhase> {
        let tap_line = engine.config().danger_line_y * TAP_DEPTH;
        let mut elapsed = 0.0;
        let mut since_tap = 0.0;

        while elapsed < STAGE_TIME_LIMIT_MS {
            engine.update(HOST_FRAME_MS);
            elapsed += HOST_FRAME_MS;
            since_tap += HOST_FRAME_MS;

            if since_tap >= REACTION_MS {
                let target = engine
                    .state()
                    .objects
                    .iter()
                    .filter(|o| o.kind != ObjectKind::Bomb && o.y() >= tap_line)
                    .max_by(|a, b| a.y().total_cmp(&b.y()))
                    .map(|o| o.id);
                if let Some(id) = target {
                    engine.tap(id);
                    since_tap = 0.0;
                }
            }

            for event in engine.take_events() {
                if let GameEvent::Missed { lives_lost, .. } = event {
                    if lives_lost > 0 {
                        log::info!("Missed one, {} lives left", engine.state().lives);
                    }
                }
            }

            let phase = engine.phase();
            if phase != GamePhase::Playing {
                return Some(phase);
            }
        }
        None
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The engine is embedded by a host shell on the web; no standalone runner
}
