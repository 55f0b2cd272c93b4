//! MoveNet pose detection through the tfjs `pose-detection` package.
//!
//! The runtime is pulled from the CDN by injecting script tags; the resulting
//! global `poseDetection` object is driven through `js_sys::Reflect`.

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlScriptElement, HtmlVideoElement, window};

use crate::error::{GameError, Result, describe_js};
use crate::pose::{DetectedPose, PoseProvider, parse_poses};

/// Loaded in order; each one depends on the previous.
const TFJS_SCRIPTS: &[&str] = &[
    "https://cdn.jsdelivr.net/npm/@tensorflow/tfjs-core",
    "https://cdn.jsdelivr.net/npm/@tensorflow/tfjs-converter",
    "https://cdn.jsdelivr.net/npm/@tensorflow/tfjs-backend-webgl",
    "https://cdn.jsdelivr.net/npm/@tensorflow-models/pose-detection",
];

pub struct MoveNetProvider {
    detector: Option<JsValue>,
}

impl MoveNetProvider {
    pub fn new() -> Self {
        Self { detector: None }
    }
}

impl Default for MoveNetProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks script tags this module injected; the value is the source URL.
const SRC_ATTR: &str = "data-fc-src";
/// Set once a tagged script has finished loading.
const LOADED_ATTR: &str = "data-fc-loaded";

/// Resolves on the script's `load` event, rejects on `error`. Listeners are
/// added rather than assigned so several callers can wait on one tag.
fn settled(script: &HtmlScriptElement) -> Result<Promise> {
    let mut failed = None;
    let promise = Promise::new(&mut |resolve, reject| {
        let added = script
            .add_event_listener_with_callback("load", &resolve)
            .and_then(|_| script.add_event_listener_with_callback("error", &reject));
        if let Err(e) = added {
            failed = Some(e);
        }
    });
    match failed {
        Some(e) => Err(GameError::dom(e)),
        None => Ok(promise),
    }
}

/// Inject `src` once and wait until it has run. A second call while the
/// first is still loading waits on the same tag.
pub async fn load_script(doc: &Document, src: &str) -> Result<()> {
    let selector = format!("script[{SRC_ATTR}=\"{src}\"]");
    let (script, done) = match doc.query_selector(&selector).map_err(GameError::dom)? {
        Some(existing) if existing.has_attribute(LOADED_ATTR) => return Ok(()),
        Some(existing) => {
            let script: HtmlScriptElement = existing.dyn_into().map_err(GameError::dom)?;
            let done = settled(&script)?;
            (script, done)
        }
        None => {
            let script: HtmlScriptElement = doc
                .create_element("script")
                .map_err(GameError::dom)?
                .dyn_into()
                .map_err(GameError::dom)?;
            script.set_attribute(SRC_ATTR, src).map_err(GameError::dom)?;
            script.set_src(src);
            let done = settled(&script)?;
            doc.head()
                .ok_or_else(|| GameError::Dom("no <head>".into()))?
                .append_child(&script)
                .map_err(GameError::dom)?;
            (script, done)
        }
    };

    if JsFuture::from(done).await.is_err() {
        // drop the dead tag so a later attempt injects a fresh one
        script.remove();
        return Err(GameError::PoseDetector(format!("failed to load {src}")));
    }
    script.set_attribute(LOADED_ATTR, "").map_err(GameError::dom)?;
    tracing::debug!(src, "script loaded");
    Ok(())
}

fn get(target: &JsValue, key: &str) -> Result<JsValue> {
    let value = Reflect::get(target, &key.into()).map_err(GameError::pose_detector)?;
    if value.is_undefined() {
        return Err(GameError::PoseDetector(format!("missing `{key}`")));
    }
    Ok(value)
}

fn method(target: &JsValue, name: &str) -> Result<Function> {
    get(target, name)?
        .dyn_into::<Function>()
        .map_err(|_| GameError::PoseDetector(format!("`{name}` is not a function")))
}

#[async_trait(?Send)]
impl PoseProvider for MoveNetProvider {
    fn name(&self) -> &str {
        "movenet-lite"
    }

    async fn init(&mut self) -> Result<()> {
        let win = window().ok_or_else(|| GameError::Dom("no window".into()))?;
        let doc = win.document().ok_or_else(|| GameError::Dom("no document".into()))?;
        for src in TFJS_SCRIPTS {
            load_script(&doc, src).await?;
        }

        let api = get(&win, "poseDetection")?;
        let model = get(&get(&api, "SupportedModels")?, "MoveNet")?;
        let options = Object::new();
        Reflect::set(&options, &"runtime".into(), &"tfjs".into()).map_err(GameError::pose_detector)?;
        Reflect::set(&options, &"modelType".into(), &"lite".into()).map_err(GameError::pose_detector)?;
        let pending = method(&api, "createDetector")?
            .call2(&api, &model, &options)
            .map_err(GameError::pose_detector)?;
        let detector = JsFuture::from(Promise::from(pending))
            .await
            .map_err(GameError::pose_detector)?;
        self.detector = Some(detector);
        tracing::info!(provider = self.name(), "pose detector ready");
        Ok(())
    }

    async fn estimate(&self, video: &HtmlVideoElement) -> Result<Vec<DetectedPose>> {
        let detector = self
            .detector
            .as_ref()
            .ok_or_else(|| GameError::PoseDetector("not initialized".into()))?;
        let pending = method(detector, "estimatePoses")?
            .call1(detector, video)
            .map_err(GameError::pose_detector)?;
        let poses = JsFuture::from(Promise::from(pending))
            .await
            .map_err(GameError::pose_detector)?;
        let json = js_sys::JSON::stringify(&poses)
            .map_err(GameError::pose_detector)?
            .as_string()
            .unwrap_or_default();
        parse_poses(&json).map_err(|e| GameError::PoseDetector(e.to_string()))
    }
}

impl Drop for MoveNetProvider {
    fn drop(&mut self) {
        if let Some(detector) = self.detector.take() {
            if let Ok(dispose) = method(&detector, "dispose") {
                if let Err(e) = dispose.call0(&detector) {
                    tracing::warn!("detector dispose failed: {}", describe_js(&e));
                }
            }
        }
    }
}
