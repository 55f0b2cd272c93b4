//! Clap detection and fruit catching.
//!
//! Hand points arrive in raw camera space; fruit live in display space. The
//! clap point is the hands' midpoint mirrored once into display space and is
//! then compared against fruit directly.

use crate::config::GameConfig;
use crate::fruit::{Fruit, FruitField};
use crate::geometry::Point;
use crate::pose::PoseSnapshot;

/// A fruit removed by a clap.
#[derive(Clone, Debug, PartialEq)]
pub struct Catch {
    pub fruit_id: u64,
    pub points: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct ClapDetector {
    clap_distance: f64,
    catch_radius: f64,
}

impl ClapDetector {
    pub fn new(clap_distance: f64, catch_radius: f64) -> Self {
        Self { clap_distance, catch_radius }
    }

    pub fn from_config(cfg: &GameConfig) -> Self {
        Self::new(cfg.clap_distance, cfg.catch_radius)
    }

    pub fn catch_radius(&self) -> f64 {
        self.catch_radius
    }

    /// Display-space clap point, or `None` when a hand is missing or the hands
    /// are not strictly closer than the clap distance.
    pub fn clap_point(&self, pose: &PoseSnapshot, width: f64) -> Option<Point> {
        let (left, right) = pose.both_hands()?;
        if left.distance(&right) >= self.clap_distance {
            return None;
        }
        Some(left.midpoint(&right).mirrored(width))
    }

    /// Remove every fruit strictly inside the catch radius of `clap`, calling
    /// `on_catch` once per fruit with its point value.
    pub fn catch(
        &self,
        field: &mut FruitField,
        clap: Point,
        mut on_catch: impl FnMut(u32),
    ) -> Vec<Catch> {
        let mut caught = Vec::new();
        field.remove_where(|f: &Fruit| {
            if Point::new(f.x, f.y).distance(&clap) < self.catch_radius {
                on_catch(f.points);
                caught.push(Catch { fruit_id: f.id, points: f.points });
                true
            } else {
                false
            }
        });
        caught
    }

    /// Full per-frame check: detect a clap and resolve catches.
    pub fn resolve(
        &self,
        pose: &PoseSnapshot,
        width: f64,
        field: &mut FruitField,
        on_catch: impl FnMut(u32),
    ) -> Vec<Catch> {
        match self.clap_point(pose, width) {
            Some(clap) => self.catch(field, clap, on_catch),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FRUIT_CATALOG;

    fn hands(l: (f64, f64), r: (f64, f64)) -> PoseSnapshot {
        PoseSnapshot {
            left_hand: Some(Point::new(l.0, l.1)),
            right_hand: Some(Point::new(r.0, r.1)),
        }
    }

    #[test]
    fn test_missing_hand_never_claps() {
        let det = ClapDetector::new(80.0, 60.0);
        let pose = PoseSnapshot { left_hand: Some(Point::new(1.0, 1.0)), right_hand: None };
        assert!(det.clap_point(&pose, 640.0).is_none());
    }

    #[test]
    fn test_hand_distance_boundary_is_exclusive() {
        let det = ClapDetector::new(80.0, 60.0);
        assert!(det.clap_point(&hands((100.0, 100.0), (180.0, 100.0)), 640.0).is_none());
        let clap = det.clap_point(&hands((100.0, 100.0), (179.9, 100.0)), 640.0).unwrap();
        assert!((clap.x - (640.0 - 139.95)).abs() < 1e-9);
        assert_eq!(clap.y, 100.0);
    }

    #[test]
    fn test_catch_radius_boundary_is_exclusive() {
        let cfg = GameConfig::default();
        let det = ClapDetector::from_config(&cfg);
        let mut field = FruitField::new();
        let at_edge = field.spawn(FRUIT_CATALOG[0], 360.0, 2.0, 0.0, &cfg);
        let inside = field.spawn(FRUIT_CATALOG[1], 300.0, 2.0, 0.0, &cfg);
        let clap = Point::new(300.0, -50.0);
        let mut total = 0;
        let caught = det.catch(&mut field, clap, |p| total += p);
        assert_eq!(caught.len(), 1);
        assert_eq!(caught[0].fruit_id, inside);
        assert_eq!(total, FRUIT_CATALOG[1].points);
        assert_eq!(field.fruits()[0].id, at_edge);
    }

    #[test]
    fn test_one_clap_can_catch_several() {
        let cfg = GameConfig::default();
        let det = ClapDetector::from_config(&cfg);
        let mut field = FruitField::new();
        field.spawn(FRUIT_CATALOG[0], 290.0, 2.0, 0.0, &cfg);
        field.spawn(FRUIT_CATALOG[5], 310.0, 2.0, 0.0, &cfg);
        field.spawn(FRUIT_CATALOG[2], 500.0, 2.0, 0.0, &cfg);
        let mut calls = Vec::new();
        // raw midpoint x=340 mirrors to 300
        let pose = hands((330.0, -50.0), (350.0, -50.0));
        let caught = det.resolve(&pose, 640.0, &mut field, |p| calls.push(p));
        assert_eq!(caught.len(), 2);
        assert_eq!(caught.iter().map(|c| c.points).collect::<Vec<_>>(), calls);
        assert_eq!(calls, vec![10, 50]);
        assert_eq!(field.len(), 1);
    }
}
