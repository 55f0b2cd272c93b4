//! Game tunables and commentary service settings.
//!
//! Everything has a default matching the shipped game; a JSON document passed
//! to `configure()` may override any subset of fields before the game starts.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub camera: CameraConfig,
    pub commentary: CommentaryConfig,
}

impl Config {
    /// Parse and validate; a config that parses but could not run is rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| GameError::Config(e.to_string()))?;
        config.game.validate()?;
        Ok(config)
    }
}

/// Timing, spawn and collision constants for one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Round length in countdown ticks (seconds).
    pub round_secs: u32,
    pub tick_ms: u32,
    /// Minimum wall-clock gap between two spawns.
    pub spawn_interval_ms: f64,
    /// Horizontal keep-out on both sides of the canvas for new fruit.
    pub spawn_margin: f64,
    pub spawn_y: f64,
    pub min_speed: f64,
    /// Exclusive upper bound.
    pub max_speed: f64,
    pub fruit_radius: f64,
    /// Fruit are kept while `y < height + despawn_margin`.
    pub despawn_margin: f64,
    /// Wrist keypoints must score strictly above this.
    pub hand_confidence: f64,
    /// Hands strictly closer than this count as a clap.
    pub clap_distance: f64,
    /// Fruit strictly closer than this to the clap point are caught.
    pub catch_radius: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_secs: 60,
            tick_ms: 1000,
            spawn_interval_ms: 1200.0,
            spawn_margin: 50.0,
            spawn_y: -50.0,
            min_speed: 2.0,
            max_speed: 4.0,
            fruit_radius: 30.0,
            despawn_margin: 100.0,
            hand_confidence: 0.3,
            clap_distance: 80.0,
            catch_radius: 60.0,
        }
    }
}

fn invalid(msg: String) -> GameError {
    GameError::Config(msg)
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("`{name}` must be a finite non-negative number, got {value}")))
    }
}

impl GameConfig {
    /// Reject values the spawner, the countdown interval or the collision
    /// checks cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.round_secs == 0 {
            return Err(invalid("`round_secs` must be at least 1".into()));
        }
        if self.tick_ms == 0 || i32::try_from(self.tick_ms).is_err() {
            return Err(invalid(format!("`tick_ms` must be in 1..={}, got {}", i32::MAX, self.tick_ms)));
        }
        for (name, value) in [
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("spawn_margin", self.spawn_margin),
            ("despawn_margin", self.despawn_margin),
            ("fruit_radius", self.fruit_radius),
            ("clap_distance", self.clap_distance),
            ("catch_radius", self.catch_radius),
            ("min_speed", self.min_speed),
        ] {
            non_negative(name, value)?;
        }
        if !self.max_speed.is_finite() || self.min_speed >= self.max_speed {
            return Err(invalid(format!(
                "speed range {}..{} is empty",
                self.min_speed, self.max_speed
            )));
        }
        if !self.spawn_y.is_finite() || !self.hand_confidence.is_finite() {
            return Err(invalid("`spawn_y` and `hand_confidence` must be finite".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { width: 640, height: 480, frame_rate: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentaryConfig {
    /// Baked in from the `API_KEY` build environment variable when present.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self {
            api_key: option_env!("API_KEY").map(str::to_string),
            model: "gemini-3-flash-preview".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}
