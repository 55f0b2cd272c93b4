// Integration tests (native) for the `fruit-clapper` crate.
// These tests avoid wasm-specific functionality and exercise pure Rust logic so
// they can run under `cargo test` on the host.

use fruit_clapper::commentary::{
    CommentaryError, CommentaryResult, CommentaryService, CommentarySlot, ERROR_FALLBACK,
    fetch_commentary,
};
use fruit_clapper::{
    ClapDetector, FRUIT_CATALOG, FruitField, GameConfig, GameController, GameStatus, Point,
    PoseSnapshot, Session, TickOutcome,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn controller(seed: u64) -> GameController<StdRng> {
    GameController::new(GameConfig::default(), StdRng::seed_from_u64(seed))
}

// Spawns in [0, T) stay within one of floor(T / 1200) at common frame rates.
#[test]
fn spawn_cadence_follows_wall_clock_not_frame_rate() {
    for fps in [120.0, 60.0, 30.0] {
        for window_ms in [6_000.0, 12_000.0, 30_000.0] {
            let mut g = controller(9);
            g.start();
            let dt = 1_000.0 / fps;
            let mut spawns = 0i64;
            let mut frame = 0u64;
            loop {
                let now = frame as f64 * dt;
                if now >= window_ms {
                    break;
                }
                if g.frame(now, 640.0, 480.0).spawned.is_some() {
                    spawns += 1;
                }
                frame += 1;
            }
            let expected = (window_ms / 1_200.0).floor() as i64;
            assert!(
                (spawns - expected).abs() <= 1,
                "{fps} fps over {window_ms} ms: {spawns} spawns, expected {expected} ± 1"
            );
        }
    }
}

// Fruit spawned at (300, -50), advanced to y = 298, caught by a clap whose
// mirrored midpoint is (300, 300) with the hands 40 px apart.
#[test]
fn clap_scenario_catches_exactly_once() {
    let cfg = GameConfig::default();
    let detector = ClapDetector::from_config(&cfg);
    let mut field = FruitField::new();
    let kind = FRUIT_CATALOG[4];
    let id = field.spawn(kind, 300.0, 3.0, 0.0, &cfg);

    let no_hands = PoseSnapshot::default();
    let mut calls: Vec<u32> = Vec::new();
    while field.fruits()[0].y < 298.0 {
        field.advance(480.0, &cfg);
        detector.resolve(&no_hands, 640.0, &mut field, |p| calls.push(p));
    }
    assert_eq!(field.fruits()[0].y, 298.0);
    assert!(calls.is_empty());

    let clap = PoseSnapshot {
        left_hand: Some(Point::new(320.0, 300.0)),
        right_hand: Some(Point::new(360.0, 300.0)),
    };
    assert_eq!(detector.clap_point(&clap, 640.0), Some(Point::new(300.0, 300.0)));
    let caught = detector.resolve(&clap, 640.0, &mut field, |p| calls.push(p));
    assert_eq!(caught.len(), 1);
    assert_eq!(caught[0].fruit_id, id);
    assert_eq!(calls, vec![kind.points]);
    assert!(field.is_empty());

    // a second clap in the same spot has nothing left to catch
    detector.resolve(&clap, 640.0, &mut field, |p| calls.push(p));
    assert_eq!(calls.len(), 1);
}

#[test]
fn score_never_decreases_within_a_round() {
    let mut g = controller(21);
    let mut hands_rng = StdRng::seed_from_u64(99);
    g.start();
    let mut last_score = 0;
    let mut frame = 0u64;
    while g.status() == GameStatus::Playing {
        let base = Point::new(hands_rng.gen_range(0.0..640.0), hands_rng.gen_range(0.0..480.0));
        let spread = hands_rng.gen_range(0.0..120.0);
        g.set_pose(PoseSnapshot {
            left_hand: Some(base),
            right_hand: Some(Point::new(base.x + spread, base.y)),
        });
        g.frame(frame as f64 * 16.0, 640.0, 480.0);
        let score = g.state().score;
        assert!(score >= last_score, "score dropped from {last_score} to {score}");
        last_score = score;
        frame += 1;
        if frame % 60 == 0 {
            g.tick();
        }
    }
    assert_eq!(g.state().score, last_score);
    g.start();
    assert_eq!(g.state().score, 0);
}

#[test]
fn countdown_reaches_gameover_after_sixty_ticks() {
    let mut g = controller(1);
    g.start();
    assert_eq!(g.state().time_left, 60);
    let mut ended = 0;
    for _ in 0..60 {
        if let TickOutcome::Ended(_) = g.tick() {
            ended += 1;
        }
    }
    assert_eq!(ended, 1);
    assert_eq!(g.status(), GameStatus::GameOver);
    assert_eq!(g.state().time_left, 0);
    assert_eq!(g.tick(), TickOutcome::Ignored);
    // no fruit activity after the round ends
    assert!(g.frame(1e9, 640.0, 480.0).spawned.is_none());
}

#[test]
fn high_score_is_kept_across_rounds() {
    let mut session = Session::new(1);
    let mut highs = Vec::new();
    for (i, score) in [30, 10, 50].into_iter().enumerate() {
        assert!(session.start());
        session.add_score(score);
        match session.tick() {
            TickOutcome::Ended(summary) => {
                assert_eq!(summary.final_score, score);
                highs.push(summary.high_score);
            }
            other => panic!("round {i} did not end: {other:?}"),
        }
        if i == 1 {
            assert!(session.go_home());
        }
    }
    assert_eq!(highs, vec![30, 30, 50]);
    assert_eq!(session.high_score(), 50);
}

struct Unreachable;

#[async_trait::async_trait(?Send)]
impl CommentaryService for Unreachable {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn generate(&self, _prompt: &str) -> CommentaryResult<Option<String>> {
        Err(CommentaryError::Network("connection refused".to_string()))
    }
}

#[test]
fn failing_commentary_shows_fallback() {
    let mut session = Session::new(1);
    session.start();
    session.add_score(70);
    let TickOutcome::Ended(summary) = session.tick() else {
        panic!("round should have ended");
    };
    let slot = CommentarySlot::default();
    let ticket = slot.begin();
    let text = futures::executor::block_on(fetch_commentary(&Unreachable, &summary));
    assert!(slot.deliver(ticket, text));
    assert_eq!(slot.text(), ERROR_FALLBACK);
    assert_eq!(session.status(), GameStatus::GameOver);
}

#[test]
fn configured_speed_range_is_usable_or_rejected() {
    use fruit_clapper::{Config, GameError};
    let err = Config::from_json(r#"{"game": {"min_speed": 3.0, "max_speed": 3.0}}"#).unwrap_err();
    assert!(matches!(err, GameError::Config(_)));

    let cfg = Config::from_json(r#"{"game": {"min_speed": 3.0, "max_speed": 3.001}}"#).unwrap();
    let mut g = GameController::new(cfg.game, StdRng::seed_from_u64(4));
    g.start();
    assert!(g.frame(0.0, 640.0, 480.0).spawned.is_some());
    let speed = g.fruits()[0].speed;
    assert!((3.0..3.001).contains(&speed));
}
