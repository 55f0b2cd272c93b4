//! Fruit Clapper core crate.
//!
//! A webcam minigame: pose detection tracks both wrists, clapping the hands
//! together catches the falling fruit under the clap, and a generative text
//! service comments on the final score. Game logic (`fruit`, `clap`,
//! `session`, `game`) is plain Rust and runs natively under `cargo test`; the
//! browser glue lives in `app` and the modules it drives.

use wasm_bindgen::prelude::*;

mod app;
pub mod camera;
pub mod clap;
pub mod commentary;
pub mod config;
pub mod detector;
pub mod error;
pub mod fruit;
pub mod game;
pub mod geometry;
pub mod overlay;
pub mod pose;
pub mod render;
pub mod session;

pub use clap::{Catch, ClapDetector};
pub use config::{CameraConfig, CommentaryConfig, Config, GameConfig};
pub use error::{GameError, Result};
pub use fruit::{Fruit, FruitField, FruitKind};
pub use game::{FrameReport, GameController};
pub use geometry::Point;
pub use pose::{HandTracker, PoseSnapshot};
pub use session::{GameState, GameStatus, Session, SessionSummary, TickOutcome};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::INFO)
            .build(),
    );
}

// -----------------------------------------------------------------------------
// Fruit catalog. Picked uniformly at spawn time.
// -----------------------------------------------------------------------------

pub const FRUIT_CATALOG: &[FruitKind] = &[
    FruitKind { name: "apple", emoji: "🍎", points: 10 },
    FruitKind { name: "orange", emoji: "🍊", points: 15 },
    FruitKind { name: "banana", emoji: "🍌", points: 20 },
    FruitKind { name: "grape", emoji: "🍇", points: 25 },
    FruitKind { name: "strawberry", emoji: "🍓", points: 30 },
    FruitKind { name: "watermelon", emoji: "🍉", points: 50 },
];

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Override any subset of the default configuration (JSON). Takes effect on
/// the next `start_game()`.
#[wasm_bindgen]
pub fn configure(json: &str) -> std::result::Result<(), JsValue> {
    app::set_config(Config::from_json(json)?);
    Ok(())
}

#[wasm_bindgen]
pub fn start_game() -> std::result::Result<(), JsValue> {
    app::start().map_err(JsValue::from)
}

/// Release the camera and remove the game from the page.
#[wasm_bindgen]
pub fn stop_game() {
    app::stop();
}
