//! DOM HUD and full-screen overlays (loading, title, gameover).
//!
//! Elements are created once with inline styles and then only toggled and
//! re-texted every frame.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlVideoElement};

use crate::error::{GameError, Result};
use crate::session::{GameState, GameStatus};

const PANEL_STYLE: &str = "position:absolute; inset:0; display:flex; flex-direction:column; align-items:center; justify-content:center; text-align:center; padding:24px; z-index:60; font-family:sans-serif; color:#fff;";
const BOX_STYLE: &str = "background:rgba(0,0,0,0.4); padding:12px 18px; border-radius:24px; border:1px solid rgba(255,255,255,0.1); font-family:sans-serif; font-weight:900; font-size:36px; color:#fff; font-variant-numeric:tabular-nums;";
const BUTTON_STYLE: &str = "font-size:22px; font-weight:900; padding:16px 40px; margin:8px; border:none; border-radius:999px; cursor:pointer;";

/// Camera / detector bring-up state.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Which panels are shown for a given state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Panels {
    pub loading: bool,
    pub title: bool,
    pub hud: bool,
    pub hint: bool,
    pub gameover: bool,
}

pub fn panels(load: &LoadState, status: GameStatus) -> Panels {
    let ready = *load == LoadState::Ready;
    Panels {
        loading: !ready,
        title: status == GameStatus::Idle,
        hud: status == GameStatus::Playing,
        hint: ready && status == GameStatus::Playing,
        gameover: status == GameStatus::GameOver,
    }
}

pub fn loading_text(load: &LoadState) -> String {
    match load {
        LoadState::Loading | LoadState::Ready => "AIモデル読込中...".to_string(),
        LoadState::Failed(reason) => format!("カメラまたはAIモデルを起動できませんでした: {reason}"),
    }
}

pub struct Overlay {
    pub canvas: HtmlCanvasElement,
    pub video: HtmlVideoElement,
    pub start: HtmlElement,
    pub retry: HtmlElement,
    pub home: HtmlElement,
    hud: HtmlElement,
    score: HtmlElement,
    time: HtmlElement,
    best: HtmlElement,
    loading: HtmlElement,
    loading_text: HtmlElement,
    title: HtmlElement,
    hint: HtmlElement,
    gameover: HtmlElement,
    final_score: HtmlElement,
    comment: HtmlElement,
    best_footer: HtmlElement,
}

fn el(doc: &Document, tag: &str, id: &str, style: &str, text: &str) -> Result<HtmlElement> {
    let e: HtmlElement = doc
        .create_element(tag)
        .map_err(GameError::dom)?
        .dyn_into()
        .map_err(GameError::dom)?;
    e.set_id(id);
    e.set_attribute("style", style).map_err(GameError::dom)?;
    if !text.is_empty() {
        e.set_text_content(Some(text));
    }
    Ok(e)
}

fn append(parent: &HtmlElement, children: &[&HtmlElement]) -> Result<()> {
    for child in children {
        parent.append_child(child).map_err(GameError::dom)?;
    }
    Ok(())
}

fn show(e: &HtmlElement, visible: bool, display: &str) {
    let value = if visible { display } else { "none" };
    e.style().set_property("display", value).ok();
}

fn set_text(e: &HtmlElement, text: &str) {
    if e.text_content().as_deref() != Some(text) {
        e.set_text_content(Some(text));
    }
}

impl Overlay {
    /// Build the whole page under `<body>`, replacing a previous build.
    pub fn build(doc: &Document) -> Result<Self> {
        if let Some(old) = doc.get_element_by_id("fc-root") {
            old.remove();
        }
        let body = doc.body().ok_or_else(|| GameError::Dom("no <body>".into()))?;
        let root = el(doc, "div", "fc-root", "position:fixed; inset:0; background:#020617; display:flex; align-items:center; justify-content:center; overflow:hidden;", "")?;

        let video: HtmlVideoElement = el(doc, "video", "fc-video", "display:none;", "")?
            .dyn_into()
            .map_err(GameError::dom)?;
        video.set_attribute("playsinline", "").map_err(GameError::dom)?;
        let canvas: HtmlCanvasElement = el(doc, "canvas", "fc-canvas", "max-width:100%; max-height:100%; border:4px solid #1e293b; border-radius:24px; background:#000;", "")?
            .dyn_into()
            .map_err(GameError::dom)?;
        canvas.set_width(640);
        canvas.set_height(480);

        // HUD
        let hud = el(doc, "div", "fc-hud", "position:absolute; top:16px; left:16px; right:16px; display:flex; justify-content:space-between; z-index:50; pointer-events:none;", "")?;
        let score = el(doc, "div", "fc-score", BOX_STYLE, "0")?;
        let time = el(doc, "div", "fc-time", BOX_STYLE, "60s")?;
        let best = el(doc, "div", "fc-best", BOX_STYLE, "0")?;
        append(&hud, &[&score, &time, &best])?;

        let loading = el(doc, "div", "fc-loading", &format!("{PANEL_STYLE} background:#0f172a; z-index:70;"), "")?;
        let loading_text = el(doc, "p", "fc-loading-text", "font-size:18px; max-width:480px;", "AIモデル読込中...")?;
        append(&loading, &[&loading_text])?;

        // Title screen
        let title = el(doc, "div", "fc-title", &format!("{PANEL_STYLE} background:rgba(2,6,23,0.8);"), "")?;
        let heading = el(doc, "h1", "fc-heading", "font-size:72px; font-weight:900; color:#fb923c; margin:0 0 24px;", "FRUIT CLAPPER")?;
        let intro = el(doc, "p", "fc-intro", "font-size:20px; color:#94a3b8; margin-bottom:32px;", "カメラの前で両手を叩いて、降ってくるフルーツを華麗にゲットしよう！")?;
        let how = el(doc, "p", "fc-how", "font-size:14px; color:#94a3b8;", "👏 左右の手を合わせるとキャッチ判定が発生します")?;
        let start = el(doc, "button", "fc-start", &format!("{BUTTON_STYLE} background:#f97316; color:#fff;"), "GAME START")?;
        append(&title, &[&heading, &intro, &how, &start])?;

        let hint = el(doc, "div", "fc-hint", "position:absolute; bottom:40px; left:50%; transform:translateX(-50%); background:rgba(0,0,0,0.4); padding:8px 24px; border-radius:999px; color:#fff; font-weight:700; font-size:14px; z-index:50;", "👏 両手を合わせるとフルーツをキャッチ！")?;

        // Gameover screen
        let gameover = el(doc, "div", "fc-gameover", &format!("{PANEL_STYLE} background:rgba(2,6,23,0.9);"), "")?;
        let times_up = el(doc, "h2", "fc-times-up", "font-size:56px; font-weight:900; margin:8px 0;", "TIME'S UP!")?;
        let final_score = el(doc, "div", "fc-final-score", "font-size:112px; font-weight:900; color:#fdba74; margin:24px 0;", "0")?;
        let comment = el(doc, "p", "fc-comment", "font-size:20px; font-style:italic; color:#e2e8f0; max-width:420px; padding:24px; border:1px solid rgba(255,255,255,0.1); border-radius:32px; margin-bottom:32px;", "")?;
        let buttons = el(doc, "div", "fc-buttons", "display:flex; flex-wrap:wrap; justify-content:center;", "")?;
        let retry = el(doc, "button", "fc-retry", &format!("{BUTTON_STYLE} background:#fff; color:#020617;"), "RETRY")?;
        let home = el(doc, "button", "fc-home", &format!("{BUTTON_STYLE} background:rgba(255,255,255,0.1); color:#fff;"), "TITLE")?;
        append(&buttons, &[&retry, &home])?;
        let best_footer = el(doc, "div", "fc-best-footer", "margin-top:40px; color:#64748b; font-weight:700; font-size:12px; letter-spacing:0.2em;", "")?;
        append(&gameover, &[&times_up, &final_score, &comment, &buttons, &best_footer])?;

        let video_el: &HtmlElement = video.as_ref();
        let canvas_el: &HtmlElement = canvas.as_ref();
        append(&root, &[video_el, canvas_el, &hud, &hint, &title, &gameover, &loading])?;
        body.append_child(&root).map_err(GameError::dom)?;

        Ok(Self {
            canvas,
            video,
            start,
            retry,
            home,
            hud,
            score,
            time,
            best,
            loading,
            loading_text,
            title,
            hint,
            gameover,
            final_score,
            comment,
            best_footer,
        })
    }

    /// Refresh visibility and text from the current state.
    pub fn update(&self, load: &LoadState, state: &GameState, high_score: u32, commentary: &str) {
        let p = panels(load, state.status);
        show(&self.loading, p.loading, "flex");
        show(&self.title, p.title, "flex");
        show(&self.hud, p.hud, "flex");
        show(&self.hint, p.hint, "block");
        show(&self.gameover, p.gameover, "flex");

        set_text(&self.loading_text, &loading_text(load));
        set_text(&self.score, &state.score.to_string());
        set_text(&self.time, &format!("{}s", state.time_left));
        let time_color = if state.time_left < 10 { "#ef4444" } else { "#fff" };
        self.time.style().set_property("color", time_color).ok();
        set_text(&self.best, &high_score.to_string());
        set_text(&self.final_score, &state.score.to_string());
        set_text(&self.comment, &format!("\"{commentary}\""));
        set_text(&self.best_footer, &format!("BEST SCORE: {high_score}"));
    }

    pub fn remove(&self, doc: &Document) {
        if let Some(root) = doc.get_element_by_id("fc-root") {
            root.remove();
        }
    }
}
