//! Game loop controller.
//!
//! Owns every piece of mutable game state (session, fruit, latest pose, RNG).
//! The browser runtime calls [`GameController::frame`] once per rendered frame
//! and [`GameController::tick`] once per second; both take `&mut self`.

use rand::Rng;

use crate::clap::{Catch, ClapDetector};
use crate::config::GameConfig;
use crate::fruit::{Fruit, FruitField};
use crate::geometry::Point;
use crate::pose::PoseSnapshot;
use crate::session::{GameState, GameStatus, Session, TickOutcome};

/// What happened during one frame step.
#[derive(Debug, Default, PartialEq)]
pub struct FrameReport {
    pub spawned: Option<u64>,
    pub discarded: usize,
    pub clap: Option<Point>,
    pub catches: Vec<Catch>,
}

pub struct GameController<R: Rng> {
    config: GameConfig,
    session: Session,
    field: FruitField,
    pose: PoseSnapshot,
    detector: ClapDetector,
    rng: R,
}

impl<R: Rng> GameController<R> {
    pub fn new(config: GameConfig, rng: R) -> Self {
        Self {
            session: Session::new(config.round_secs),
            field: FruitField::new(),
            pose: PoseSnapshot::default(),
            detector: ClapDetector::from_config(&config),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.session.state()
    }

    pub fn status(&self) -> GameStatus {
        self.session.status()
    }

    pub fn high_score(&self) -> u32 {
        self.session.high_score()
    }

    pub fn fruits(&self) -> &[Fruit] {
        self.field.fruits()
    }

    pub fn pose(&self) -> &PoseSnapshot {
        &self.pose
    }

    pub fn detector(&self) -> &ClapDetector {
        &self.detector
    }

    /// Direct access for scripted setups.
    pub fn field_mut(&mut self) -> &mut FruitField {
        &mut self.field
    }

    /// Start or retry a round. Clears leftover fruit from the previous round.
    pub fn start(&mut self) -> bool {
        let started = self.session.start();
        if started {
            self.field.clear();
            tracing::info!("round started");
        }
        started
    }

    pub fn go_home(&mut self) -> bool {
        let home = self.session.go_home();
        if home {
            self.field.clear();
        }
        home
    }

    /// Replace the pose snapshot with the latest detection.
    pub fn set_pose(&mut self, pose: PoseSnapshot) {
        self.pose = pose;
    }

    /// Spawn, advance and collide. Does nothing unless a round is running.
    pub fn frame(&mut self, now_ms: f64, width: f64, height: f64) -> FrameReport {
        if !self.session.is_playing() {
            return FrameReport::default();
        }
        let spawned = self.field.spawn_if_due(now_ms, width, &self.config, &mut self.rng);
        let discarded = self.field.advance(height, &self.config);

        let clap = self.detector.clap_point(&self.pose, width);
        let catches = match clap {
            Some(point) => {
                let session = &mut self.session;
                self.detector.catch(&mut self.field, point, |points| {
                    session.add_score(points);
                })
            }
            None => Vec::new(),
        };
        for c in &catches {
            tracing::debug!(fruit = c.fruit_id, points = c.points, "caught");
        }
        FrameReport { spawned, discarded, clap, catches }
    }

    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.session.tick();
        if let TickOutcome::Ended(summary) = outcome {
            tracing::info!(
                score = summary.final_score,
                high_score = summary.high_score,
                "round over"
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FRUIT_CATALOG;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn controller() -> GameController<StdRng> {
        GameController::new(GameConfig::default(), StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_frame_is_inert_when_idle() {
        let mut g = controller();
        let report = g.frame(10_000.0, 640.0, 480.0);
        assert_eq!(report, FrameReport::default());
        assert!(g.fruits().is_empty());
    }

    #[test]
    fn test_first_frame_of_round_spawns() {
        let mut g = controller();
        g.start();
        let report = g.frame(0.0, 640.0, 480.0);
        assert!(report.spawned.is_some());
        assert_eq!(g.fruits().len(), 1);
        // spawned at -50 then advanced once
        assert!(g.fruits()[0].y > -50.0);
    }

    #[test]
    fn test_catch_adds_score_only_while_playing() {
        let mut g = controller();
        g.start();
        let cfg = g.config().clone();
        g.field_mut().spawn(FRUIT_CATALOG[3], 300.0, 2.0, 0.0, &cfg);
        g.set_pose(PoseSnapshot {
            left_hand: Some(Point::new(330.0, -48.0)),
            right_hand: Some(Point::new(350.0, -48.0)),
        });
        let report = g.frame(1.0, 640.0, 480.0);
        assert_eq!(report.catches.len(), 1);
        assert_eq!(g.state().score, 25);
    }

    #[test]
    fn test_retry_clears_old_fruit() {
        let mut g = GameController::new(
            GameConfig { round_secs: 1, ..GameConfig::default() },
            StdRng::seed_from_u64(5),
        );
        g.start();
        g.frame(0.0, 640.0, 480.0);
        assert!(!g.fruits().is_empty());
        assert!(matches!(g.tick(), TickOutcome::Ended(_)));
        assert!(g.start());
        assert!(g.fruits().is_empty());
    }
}
