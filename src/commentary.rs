//! End-of-round commentary from a generative text service.
//!
//! The request runs in the background; its result lands in a
//! [`CommentarySlot`] which the overlay reads every frame. Failures never
//! surface as errors: they are logged and replaced with a fixed line.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CommentaryConfig;
use crate::session::SessionSummary;

pub const INITIAL_COMMENTARY: &str = "カメラを許可してゲームを始めよう！";
pub const PENDING_COMMENTARY: &str = "コメントを考え中...";
/// Shown when the service answered with no text.
pub const EMPTY_FALLBACK: &str = "ナイスチャレンジ！";
/// Shown when the request failed for any reason.
pub const ERROR_FALLBACK: &str = "ゲーム終了！次はもっと狙っていこう！";

pub type CommentaryResult<T> = Result<T, CommentaryError>;

#[derive(Debug, thiserror::Error)]
pub enum CommentaryError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("network error: {0}")]
    Network(String),

    #[error("service returned HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Anything that can turn a prompt into a short remark.
#[async_trait(?Send)]
pub trait CommentaryService {
    fn name(&self) -> &str;

    /// `Ok(None)` means the service answered without any text.
    async fn generate(&self, prompt: &str) -> CommentaryResult<Option<String>>;
}

pub fn build_prompt(summary: &SessionSummary) -> String {
    format!(
        "ユーザーがゲーム「フルーツ・クラッパー」を終了しました。スコアは{}点でした。最高スコアは{}点です。短く、励ましや面白い一言を日本語で言ってください。",
        summary.final_score, summary.previous_high_score
    )
}

/// Map a service result to the line shown on the gameover screen.
pub fn commentary_text(result: CommentaryResult<Option<String>>) -> String {
    match result {
        Ok(Some(text)) if !text.trim().is_empty() => text,
        Ok(_) => EMPTY_FALLBACK.to_string(),
        Err(e) => {
            tracing::error!("commentary request failed: {e}");
            ERROR_FALLBACK.to_string()
        }
    }
}

/// Ask the service about a finished round. Never fails.
pub async fn fetch_commentary(service: &dyn CommentaryService, summary: &SessionSummary) -> String {
    let prompt = build_prompt(summary);
    tracing::debug!(service = service.name(), "requesting commentary");
    commentary_text(service.generate(&prompt).await)
}

/// Handle for one outstanding request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct SlotInner {
    text: String,
    generation: u64,
}

/// Latest commentary line. Cheap to clone; all clones share the value.
#[derive(Clone, Debug)]
pub struct CommentarySlot {
    inner: Rc<RefCell<SlotInner>>,
}

impl Default for CommentarySlot {
    fn default() -> Self {
        Self::new(INITIAL_COMMENTARY)
    }
}

impl CommentarySlot {
    pub fn new(initial: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SlotInner { text: initial.to_string(), generation: 0 })),
        }
    }

    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    /// Start a new request; shows the pending line until delivery.
    pub fn begin(&self) -> Ticket {
        let mut inner = self.inner.borrow_mut();
        inner.generation += 1;
        inner.text = PENDING_COMMENTARY.to_string();
        Ticket(inner.generation)
    }

    /// Drop interest in every outstanding ticket without touching the text.
    pub fn invalidate(&self) {
        self.inner.borrow_mut().generation += 1;
    }

    /// Store `text` if `ticket` is still current. Returns whether it was stored.
    pub fn deliver(&self, ticket: Ticket, text: String) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.generation != ticket.0 {
            return false;
        }
        inner.text = text;
        true
    }
}

/// Fire a background request whose answer lands in `slot`.
pub fn request_commentary(
    service: Rc<dyn CommentaryService>,
    slot: CommentarySlot,
    summary: SessionSummary,
) {
    let ticket = slot.begin();
    wasm_bindgen_futures::spawn_local(async move {
        let text = fetch_commentary(service.as_ref(), &summary).await;
        if !slot.deliver(ticket, text) {
            tracing::debug!("stale commentary dropped");
        }
    });
}

// --- Gemini REST client -----------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate, if any.
fn response_text(body: &str) -> CommentaryResult<Option<String>> {
    let resp: GenerateResponse =
        serde_json::from_str(body).map_err(|e| CommentaryError::MalformedResponse(e.to_string()))?;
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    Ok((!text.is_empty()).then_some(text))
}

pub struct GeminiClient {
    config: CommentaryConfig,
}

impl GeminiClient {
    pub fn new(config: CommentaryConfig) -> Self {
        Self { config }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait(?Send)]
impl CommentaryService for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> CommentaryResult<Option<String>> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CommentaryError::MissingApiKey)?;
        let body = GenerateRequest { contents: vec![Content { parts: vec![Part { text: prompt }] }] };
        let resp = gloo_net::http::Request::post(&self.url())
            .header("x-goog-api-key", key)
            .json(&body)
            .map_err(|e| CommentaryError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| CommentaryError::Network(e.to_string()))?;
        if !resp.ok() {
            return Err(CommentaryError::Status(resp.status()));
        }
        let text = resp.text().await.map_err(|e| CommentaryError::Network(e.to_string()))?;
        response_text(&text)
    }
}
