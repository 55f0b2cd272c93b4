//! Falling fruit: spawn cadence and per-frame motion.

use rand::Rng;

use crate::config::GameConfig;
use crate::FRUIT_CATALOG;

/// Catalog entry for a fruit type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FruitKind {
    pub name: &'static str,
    pub emoji: &'static str,
    pub points: u32,
}

/// A live fruit in display (mirrored canvas) coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Fruit {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub speed: f64, // pixels per frame
    pub emoji: &'static str,
    pub points: u32,
    pub radius: f64,
}

/// Owns every live fruit plus the spawn clock.
#[derive(Debug, Default)]
pub struct FruitField {
    fruits: Vec<Fruit>,
    last_spawn_ms: Option<f64>,
    next_id: u64,
}

impl FruitField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fruits(&self) -> &[Fruit] {
        &self.fruits
    }

    pub fn len(&self) -> usize {
        self.fruits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fruits.is_empty()
    }

    /// Drop all fruit and forget the last spawn so the next frame spawns.
    pub fn clear(&mut self) {
        self.fruits.clear();
        self.last_spawn_ms = None;
    }

    /// Spawn one random fruit if the spawn interval has elapsed.
    /// Gated on wall-clock time, not on frame count.
    pub fn spawn_if_due<R: Rng>(
        &mut self,
        now_ms: f64,
        width: f64,
        cfg: &GameConfig,
        rng: &mut R,
    ) -> Option<u64> {
        if let Some(last) = self.last_spawn_ms {
            if now_ms - last <= cfg.spawn_interval_ms {
                return None;
            }
        }
        let kind = FRUIT_CATALOG[rng.gen_range(0..FRUIT_CATALOG.len())];
        // Narrow canvases collapse the spawn band to the centre line.
        let lo = cfg.spawn_margin.min(width / 2.0);
        let hi = (width - cfg.spawn_margin).max(lo);
        let x = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        let speed = rng.gen_range(cfg.min_speed..cfg.max_speed);
        Some(self.spawn(kind, x, speed, now_ms, cfg))
    }

    /// Place a fruit of `kind` at `x` just above the visible area.
    pub fn spawn(&mut self, kind: FruitKind, x: f64, speed: f64, now_ms: f64, cfg: &GameConfig) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.fruits.push(Fruit {
            id,
            x,
            y: cfg.spawn_y,
            speed,
            emoji: kind.emoji,
            points: kind.points,
            radius: cfg.fruit_radius,
        });
        self.last_spawn_ms = Some(now_ms);
        id
    }

    /// Move every fruit down by its speed and discard those that left the
    /// screen. Returns how many were discarded.
    pub fn advance(&mut self, height: f64, cfg: &GameConfig) -> usize {
        let before = self.fruits.len();
        let limit = height + cfg.despawn_margin;
        self.fruits.retain_mut(|f| {
            f.y += f.speed;
            f.y < limit
        });
        before - self.fruits.len()
    }

    /// Remove every fruit for which `caught` returns true, in order.
    pub fn remove_where(&mut self, mut caught: impl FnMut(&Fruit) -> bool) -> usize {
        let before = self.fruits.len();
        self.fruits.retain(|f| !caught(f));
        before - self.fruits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_first_spawn_is_immediate_then_gated() {
        let cfg = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = FruitField::new();
        assert!(field.spawn_if_due(5_000.0, 640.0, &cfg, &mut rng).is_some());
        assert!(field.spawn_if_due(6_000.0, 640.0, &cfg, &mut rng).is_none());
        // exactly the interval is not enough
        assert!(field.spawn_if_due(6_200.0, 640.0, &cfg, &mut rng).is_none());
        assert!(field.spawn_if_due(6_200.5, 640.0, &cfg, &mut rng).is_some());
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_spawned_fruit_respect_ranges() {
        let cfg = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut field = FruitField::new();
        for i in 0..500 {
            field.spawn_if_due(i as f64 * 1_300.0, 640.0, &cfg, &mut rng);
        }
        assert_eq!(field.len(), 500);
        let mut ids = HashSet::new();
        for f in field.fruits() {
            assert!(ids.insert(f.id), "duplicate id {}", f.id);
            assert!((50.0..=590.0).contains(&f.x), "x out of range: {}", f.x);
            assert!((2.0..4.0).contains(&f.speed), "speed out of range: {}", f.speed);
            assert_eq!(f.y, -50.0);
            assert_eq!(f.radius, 30.0);
            let kind = FRUIT_CATALOG.iter().find(|k| k.emoji == f.emoji).unwrap();
            assert_eq!(kind.points, f.points);
        }
    }

    #[test]
    fn test_catalog_pick_is_roughly_uniform() {
        let cfg = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = FruitField::new();
        for i in 0..6_000 {
            field.spawn_if_due(i as f64 * 1_201.0, 640.0, &cfg, &mut rng);
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for f in field.fruits() {
            *counts.entry(f.emoji).or_default() += 1;
        }
        assert_eq!(counts.len(), FRUIT_CATALOG.len());
        for (emoji, n) in counts {
            assert!((700..1300).contains(&n), "{emoji} picked {n} times");
        }
    }

    #[test]
    fn test_y_strictly_increases_until_removed_past_bottom() {
        let cfg = GameConfig::default();
        let mut field = FruitField::new();
        field.spawn(FRUIT_CATALOG[0], 100.0, 3.5, 0.0, &cfg);
        let height = 480.0;
        let mut last_y = field.fruits()[0].y;
        loop {
            let removed = field.advance(height, &cfg);
            match field.fruits().first() {
                Some(f) => {
                    assert!(f.y > last_y);
                    assert!(f.y < height + 100.0);
                    last_y = f.y;
                }
                None => {
                    assert_eq!(removed, 1);
                    assert!(last_y + 3.5 >= height + 100.0);
                    break;
                }
            }
        }
    }

    #[test]
    fn test_clear_resets_spawn_clock() {
        let cfg = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = FruitField::new();
        field.spawn_if_due(0.0, 640.0, &cfg, &mut rng);
        field.clear();
        assert!(field.is_empty());
        assert!(field.spawn_if_due(10.0, 640.0, &cfg, &mut rng).is_some());
    }
}
