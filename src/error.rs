//! Error types for the browser runtime.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Camera unavailable: {0}")]
    Camera(String),

    #[error("Pose detector failed to load: {0}")]
    PoseDetector(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GameError>;

/// Render a thrown JS value as text for logs and error messages.
pub fn describe_js(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::JSON::stringify(value)
                .ok()
                .and_then(|s| s.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Constructors usable directly in `map_err`, for thrown values and failed
/// `dyn_into` casts alike.
impl GameError {
    pub fn dom(value: impl Into<JsValue>) -> Self {
        GameError::Dom(describe_js(&value.into()))
    }

    pub fn camera(value: impl Into<JsValue>) -> Self {
        GameError::Camera(describe_js(&value.into()))
    }

    pub fn pose_detector(value: impl Into<JsValue>) -> Self {
        GameError::PoseDetector(describe_js(&value.into()))
    }
}

impl From<GameError> for JsValue {
    fn from(e: GameError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
