//! 2-D points in video-pixel space.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Reflect horizontally against a frame of `width` pixels.
    ///
    /// Raw camera coordinates become display (mirrored canvas) coordinates and
    /// vice versa. This is the only place the mirror is applied.
    pub fn mirrored(&self, width: f64) -> Point {
        Point::new(width - self.x, self.y)
    }
}
