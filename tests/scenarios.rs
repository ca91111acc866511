use tapfall::sim::{GameEngine, GamePhase, ObjectId, ObjectKind, ObjectTemplate};

fn engine() -> GameEngine {
    GameEngine::with_defaults(2024)
}

fn template(kind: ObjectKind, points: i64) -> ObjectTemplate {
    ObjectTemplate::new("test/object", points, kind)
}

/// Tap a freshly spawned object of the given kind and value
fn tap_new(engine: &mut GameEngine, kind: ObjectKind, points: i64) {
    let id = engine
        .spawn_template(&template(kind, points), 100.0)
        .expect("engine should be playing");
    engine.tap(id);
}

#[test]
fn stage_threshold_completes_stage() {
    let mut engine = engine();
    engine.start(1);
    tap_new(&mut engine, ObjectKind::Normal, 850);

    let state = engine.state();
    assert!(state.is_stage_complete);
    assert!(!state.is_playing);
    assert!(!state.is_game_complete);
    assert_eq!(state.score, 850);
    assert!(state.objects.is_empty());
    assert_eq!(engine.phase(), GamePhase::StageComplete);
    assert!(!engine.clock().is_running());
}

#[test]
fn bomb_on_last_life_ends_game() {
    let mut engine = engine();
    engine.start(1);
    tap_new(&mut engine, ObjectKind::Bomb, -50);
    tap_new(&mut engine, ObjectKind::Bomb, -50);
    tap_new(&mut engine, ObjectKind::Normal, 300);
    assert_eq!(engine.state().lives, 1);
    assert_eq!(engine.state().score, 300);

    tap_new(&mut engine, ObjectKind::Bomb, -50);

    let state = engine.state();
    assert_eq!(state.lives, 0);
    assert!(state.is_game_over);
    assert!(!state.is_playing);
    assert_eq!(state.score, 250);
}

#[test]
fn bomb_penalty_never_goes_negative() {
    let mut engine = engine();
    engine.start(1);
    tap_new(&mut engine, ObjectKind::Normal, 20);
    tap_new(&mut engine, ObjectKind::Bomb, -50);
    assert_eq!(engine.state().score, 0);
}

#[test]
fn final_stage_completion_ends_game() {
    for kind in [ObjectKind::Normal, ObjectKind::Bomb] {
        let mut engine = engine();
        engine.start(5);
        tap_new(&mut engine, ObjectKind::Normal, 7950);
        assert_eq!(engine.state().score, 7950);
        engine.spawn();

        tap_new(&mut engine, kind, 100);

        let state = engine.state();
        assert!(state.is_game_complete, "{:?}", kind);
        assert!(state.is_stage_complete);
        assert!(!state.is_playing);
        assert_eq!(state.score, 8050);
        assert_eq!(state.lives, 3);
        assert!(state.objects.is_empty());
        assert_eq!(engine.phase(), GamePhase::GameComplete);
    }
}

#[test]
fn danger_line_costs_lives_for_safe_objects_only() {
    let mut engine = engine();
    engine.start(1);
    engine.spawn_template(&template(ObjectKind::Normal, 10), 0.0);
    engine.spawn_template(&template(ObjectKind::Golden, 80), 100.0);
    engine.spawn_template(&template(ObjectKind::Bomb, -50), 200.0);

    let danger_y = engine.config().danger_line_y;
    while engine.state().objects.len() == 3 {
        assert!(engine.state().objects.iter().all(|o| o.y() <= danger_y));
        engine.advance_frame();
    }

    let state = engine.state();
    assert!(state.objects.is_empty());
    assert_eq!(state.lives, 1);
    assert!(!state.is_game_over);
    assert!(state.is_playing);
}

#[test]
fn paused_engine_ignores_simulation_commands() {
    let mut engine = engine();
    engine.start(1);
    engine.spawn();
    let id = engine.state().objects[0].id;

    engine.pause();
    let before = engine.current_state();
    engine.advance_frame();
    engine.spawn();
    engine.tap(id);
    engine.update(10_000.0);

    assert_eq!(engine.current_state(), before);
    assert_eq!(engine.phase(), GamePhase::Paused);
}

#[test]
fn idle_engine_ignores_simulation_commands() {
    let mut engine = engine();
    let before = engine.current_state();
    engine.advance_frame();
    engine.spawn();
    engine.tap(ObjectId(1));
    assert_eq!(engine.current_state(), before);
}

#[test]
fn unknown_tap_leaves_state_unchanged() {
    let mut engine = engine();
    engine.start(1);
    engine.spawn();
    engine.advance_frame();

    let before = engine.current_state();
    engine.tap(ObjectId(9_999));
    assert_eq!(engine.current_state(), before);
}

#[test]
fn missed_object_cannot_be_tapped() {
    let mut engine = engine();
    engine.start(1);
    let id = engine
        .spawn_template(&template(ObjectKind::Bomb, -50), 0.0)
        .unwrap();
    while engine.state().object(id).is_some() {
        engine.advance_frame();
    }

    let before = engine.current_state();
    engine.tap(id);
    assert_eq!(engine.current_state(), before);
    assert_eq!(engine.state().lives, 3);
}

#[test]
fn stage_advance_happens_only_on_next_start() {
    let mut engine = engine();
    engine.start(1);
    tap_new(&mut engine, ObjectKind::Golden, 900);
    assert_eq!(engine.state().current_stage, 1);

    engine.start(2);
    assert_eq!(engine.state().current_stage, 2);
    assert_eq!(engine.phase(), GamePhase::Playing);
    // Stage 2 cadence is faster than stage 1
    assert!(engine.clock().spawn_interval_ms() < 750.0);
}

#[test]
fn clock_driven_session_loses_lives_when_idle() {
    let mut engine = engine();
    engine.start(1);
    // Nobody taps: safe objects reach the line and drain lives
    for _ in 0..20_000 {
        engine.update(50.0);
        if engine.phase() != GamePhase::Playing {
            break;
        }
    }

    let state = engine.state();
    assert_eq!(engine.phase(), GamePhase::GameOver);
    assert_eq!(state.lives, 0);
    assert!(!engine.clock().is_running());

    let frozen = engine.current_state();
    engine.update(1_000.0);
    assert_eq!(engine.current_state(), frozen);
}
