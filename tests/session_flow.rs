//! End-to-end play through the public API with the reference world

use fruit_merge::consts::SIM_DT;
use fruit_merge::leaderboard::{LocalLeaderboard, ScoreBoard};
use fruit_merge::persistence::{MemoryStorage, SessionStore, Storage};
use fruit_merge::sim::{
    DropState, FruitRecord, GameEvent, GameSession, PersistedSnapshot, SimpleWorld, TierCatalog,
};
use fruit_merge::{GameConfig, GameError, Runner, TickInput};
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn three_tier_catalog() -> TierCatalog {
    TierCatalog::from_json(
        r#"[
            { "key": "small", "radius": 15, "score": 1 },
            { "key": "medium", "radius": 20, "score": 3 },
            { "key": "large", "radius": 24, "score": 6 }
        ]"#,
    )
    .unwrap()
}

fn falling_session(catalog: TierCatalog, seed: u64) -> GameSession<SimpleWorld> {
    let config = GameConfig::default();
    GameSession::new(SimpleWorld::with_gravity(config.gravity), catalog, config, seed)
}

fn run(game: &mut GameSession<SimpleWorld>, ticks: u64) {
    for _ in 0..ticks {
        game.step();
        game.frame();
    }
}

fn record(kind: &str, x: f32, y: f32) -> FruitRecord {
    FruitRecord {
        kind: kind.to_string(),
        x,
        y,
    }
}

#[test]
fn two_small_fruits_fall_together_and_merge() {
    let mut game = falling_session(three_tier_catalog(), 1);
    game.restore(&PersistedSnapshot {
        fruits: vec![record("small", 190.0, 600.0), record("small", 200.0, 650.0)],
        ..Default::default()
    });

    run(&mut game, 240);

    let live = game.registry().all_live();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].tier, 1);
    assert_eq!(game.score(), 1);
    assert_eq!(game.best_score(), 1);
}

#[test]
fn dropped_fruit_settles_on_the_floor() {
    let mut game = falling_session(TierCatalog::standard(), 2);
    let id = game.drop_fruit().unwrap();
    run(&mut game, 600);

    let fruit = game.registry().get(id).unwrap();
    let radius = game.catalog().tier_at(fruit.tier).unwrap().radius;
    let floor = game.arena().bottom - game.arena().wall_thickness;
    assert!((fruit.pos.y + radius - floor).abs() < 3.0, "y = {}", fruit.pos.y);
    assert!(fruit.speed() < game.config().stillness_speed);
    assert!(!game.is_game_over());
}

#[test]
fn request_next_twice_gives_one_held_fruit() {
    let mut game = falling_session(TierCatalog::standard(), 3);
    game.restart();
    assert!(game.request_next().is_none());
    assert_eq!(game.registry().len(), 1);
    assert!(matches!(game.drop_state(), DropState::Held { .. }));
}

#[test]
fn held_fruit_is_not_saved_and_comes_back_on_restore() {
    let mut game = falling_session(TierCatalog::standard(), 4);
    game.drop_fruit().unwrap();
    run(&mut game, 200);
    assert!(game.held_fruit().is_some());

    let snapshot = game.snapshot();
    assert_eq!(snapshot.fruits.len(), 1);

    let mut resumed = falling_session(TierCatalog::standard(), 5);
    let summary = resumed.restore(&snapshot);
    assert_eq!(summary.restored, 1);
    assert!(resumed.held_fruit().is_some());
    assert_eq!(resumed.snapshot(), snapshot);
}

#[test]
fn restart_while_game_over_check_pending_never_ends_the_game() {
    let mut game = falling_session(TierCatalog::standard(), 6);
    // A stack of large fruits that tops out past the scoreline
    let fruits = (0..6)
        .map(|i| record("melon", 200.0, 700.0 - i as f32 * 150.0))
        .collect();
    game.restore(&PersistedSnapshot {
        fruits,
        ..Default::default()
    });
    run(&mut game, 120);

    game.restart();
    let ticks = game.config().game_over_grace_ticks() * 3;
    run(&mut game, ticks);
    assert!(!game.is_game_over());
    assert!(game
        .drain_events()
        .iter()
        .all(|e| !matches!(e, GameEvent::GameOver { .. })));
}

#[test]
fn dropping_after_game_over_is_rejected() {
    let mut game = falling_session(TierCatalog::standard(), 7);
    game.restore(&PersistedSnapshot {
        is_game_over: true,
        ..Default::default()
    });
    assert!(matches!(game.drop_fruit(), Err(GameError::InvalidState(_))));
}

#[test]
fn runner_saves_and_submits_across_a_game() {
    // No gravity, so the fruit stays parked above the scoreline
    let game = GameSession::new(
        SimpleWorld::with_gravity(0.0),
        TierCatalog::standard(),
        GameConfig::default(),
        8,
    );
    let y = game.arena().scoreline_y - 40.0;

    let mut storage = MemoryStorage::new();
    let saved = PersistedSnapshot {
        score: 12,
        best_score: 12,
        is_game_over: false,
        fruits: vec![record("grape", 150.0, y)],
    };
    storage.set("gameState", &saved.to_json().unwrap()).unwrap();

    let mut runner = Runner::new(
        game,
        SessionStore::new(storage),
        LocalLeaderboard::new(),
        &mut Pcg32::seed_from_u64(9),
    );
    assert_eq!(runner.game().score(), 12);

    let frames = runner.game().config().game_over_grace_ticks() + 10;
    for _ in 0..frames {
        runner.update(SIM_DT, &TickInput::default());
    }
    assert!(runner.game().is_game_over());

    let top = runner.scores().fetch_top_scores(10).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].score, 12);

    // A fresh game that scores less is not resubmitted
    runner.update(
        SIM_DT,
        &TickInput {
            restart: true,
            ..Default::default()
        },
    );
    assert!(!runner.game().is_game_over());
    assert_eq!(runner.game().best_score(), 12);
    assert!(!runner.game().session().needs_submit());
}
