//! Browser runtime: wires DOM, camera, pose detection and the game controller
//! together and drives them from `requestAnimationFrame` and a 1 s interval.
//!
//! All mutable state lives in one `App` inside a thread-local cell. Callbacks
//! borrow it briefly and never hold the borrow across an `.await`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, MouseEvent, window};

use crate::camera::Camera;
use crate::commentary::{CommentaryService, CommentarySlot, GeminiClient, request_commentary};
use crate::config::{CameraConfig, Config};
use crate::detector::MoveNetProvider;
use crate::error::{GameError, Result, describe_js};
use crate::game::GameController;
use crate::overlay::{LoadState, Overlay};
use crate::pose::{DetectedPose, HandTracker, PoseProvider};
use crate::render;
use crate::session::{GameStatus, TickOutcome};

type FrameCallback = Closure<dyn FnMut(f64)>;

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    static CONFIG: RefCell<Option<Config>> = const { RefCell::new(None) };
    static FRAME: RefCell<Option<FrameCallback>> = const { RefCell::new(None) };
    static EPOCH: Cell<u64> = const { Cell::new(0) };
}

/// A running `setInterval`, cleared on drop.
struct Interval {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    fn start(period_ms: i32, callback: Closure<dyn FnMut()>) -> Result<Self> {
        let win = window().ok_or_else(|| GameError::Dom("no window".into()))?;
        let id = win
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                period_ms,
            )
            .map_err(GameError::dom)?;
        Ok(Self { id, _callback: callback })
    }

    /// Stop firing without dropping the callback (safe from inside it).
    fn cancel(&self) {
        if let Some(w) = window() {
            w.clear_interval_with_handle(self.id);
        }
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct App {
    epoch: u64,
    doc: Document,
    overlay: Overlay,
    ctx: CanvasRenderingContext2d,
    controller: GameController<StdRng>,
    tracker: HandTracker,
    camera_config: CameraConfig,
    load: LoadState,
    camera: Option<Camera>,
    pose: Option<Rc<dyn PoseProvider>>,
    commentary: CommentarySlot,
    commentary_service: Rc<dyn CommentaryService>,
    countdown: Option<Interval>,
    frame_id: Option<i32>,
    _listeners: Vec<Closure<dyn FnMut(MouseEvent)>>,
}

fn with_app<T>(f: impl FnOnce(&mut App) -> T) -> Option<T> {
    APP.with(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Store a configuration to be used by the next `start_game()`.
pub fn set_config(config: Config) {
    CONFIG.with(|c| c.replace(Some(config)));
}

fn current_config() -> Config {
    CONFIG.with(|c| c.borrow().clone()).unwrap_or_default()
}

fn on_click(target: &web_sys::HtmlElement, action: fn(&mut App)) -> Result<Closure<dyn FnMut(MouseEvent)>> {
    let closure = Closure::wrap(Box::new(move |_evt: MouseEvent| {
        with_app(action);
    }) as Box<dyn FnMut(MouseEvent)>);
    target
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(GameError::dom)?;
    Ok(closure)
}

impl App {
    fn build(doc: Document, config: Config, epoch: u64) -> Result<Self> {
        let overlay = Overlay::build(&doc)?;
        let ctx: CanvasRenderingContext2d = overlay
            .canvas
            .get_context("2d")
            .map_err(GameError::dom)?
            .ok_or_else(|| GameError::Dom("2d context unavailable".into()))?
            .dyn_into()
            .map_err(GameError::dom)?;
        let listeners = vec![
            on_click(&overlay.start, App::start_round)?,
            on_click(&overlay.retry, App::start_round)?,
            on_click(&overlay.home, App::go_home)?,
        ];
        let service: Rc<dyn CommentaryService> = Rc::new(GeminiClient::new(config.commentary));
        Ok(Self {
            epoch,
            doc,
            overlay,
            ctx,
            tracker: HandTracker::new(config.game.hand_confidence),
            controller: GameController::new(config.game, StdRng::from_entropy()),
            camera_config: config.camera,
            load: LoadState::Loading,
            camera: None,
            pose: None,
            commentary: CommentarySlot::default(),
            commentary_service: service,
            countdown: None,
            frame_id: None,
            _listeners: listeners,
        })
    }

    fn refresh_overlay(&self) {
        self.overlay.update(
            &self.load,
            &self.controller.state(),
            self.controller.high_score(),
            &self.commentary.text(),
        );
    }

    fn start_round(&mut self) {
        if self.load != LoadState::Ready || !self.controller.start() {
            return;
        }
        // a reply for the previous round must not land on this one
        self.commentary.invalidate();
        let tick_ms = i32::try_from(self.controller.config().tick_ms).unwrap_or(i32::MAX);
        let tick = Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>);
        self.countdown = match Interval::start(tick_ms, tick) {
            Ok(interval) => Some(interval),
            Err(e) => {
                tracing::error!("countdown failed to start: {e}");
                None
            }
        };
        self.refresh_overlay();
    }

    fn go_home(&mut self) {
        if self.controller.go_home() {
            self.countdown = None;
            self.refresh_overlay();
        }
    }

    /// Draw one frame with fresh detections and advance the round.
    fn draw_frame(&mut self, now: f64, poses: &[DetectedPose]) {
        self.controller.set_pose(self.tracker.track(poses));
        render::sync_canvas_size(&self.overlay.canvas, &self.overlay.video);
        let width = self.overlay.canvas.width() as f64;
        let height = self.overlay.canvas.height() as f64;

        let mut drawn = render::draw_video_mirrored(&self.ctx, &self.overlay.video, width, height)
            .and_then(|_| {
                render::draw_hands(&self.ctx, self.controller.pose(), self.controller.detector(), width)
            });
        if self.controller.status() == GameStatus::Playing {
            self.controller.frame(now, width, height);
            drawn = drawn.and_then(|_| render::draw_fruits(&self.ctx, self.controller.fruits()));
        }
        if let Err(e) = drawn {
            tracing::warn!("frame draw failed: {e}");
        }
        self.refresh_overlay();
    }
}

fn on_tick() {
    with_app(|app| {
        if let TickOutcome::Ended(summary) = app.controller.tick() {
            if let Some(countdown) = &app.countdown {
                countdown.cancel();
            }
            request_commentary(app.commentary_service.clone(), app.commentary.clone(), summary);
        }
        app.refresh_overlay();
    });
}

fn request_frame() -> Option<i32> {
    let win = window()?;
    FRAME.with(|cell| {
        let mut slot = cell.borrow_mut();
        let callback = slot.get_or_insert_with(|| {
            Closure::wrap(Box::new(|ts: f64| {
                wasm_bindgen_futures::spawn_local(run_frame(ts));
            }) as Box<dyn FnMut(f64)>)
        });
        win.request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| tracing::error!("requestAnimationFrame failed: {}", describe_js(&e)))
            .ok()
    })
}

fn schedule_next_frame(epoch: u64) {
    let id = request_frame();
    with_app(|app| {
        if app.epoch == epoch {
            app.frame_id = id;
        }
    });
}

async fn run_frame(now: f64) {
    let Some((epoch, provider, video)) = with_app(|app| {
        app.frame_id = None;
        Some((app.epoch, app.pose.clone()?, app.overlay.video.clone()))
    })
    .flatten() else {
        return;
    };

    let poses = match provider.estimate(&video).await {
        Ok(poses) => poses,
        Err(e) => {
            tracing::warn!("pose estimation failed: {e}");
            Vec::new()
        }
    };

    let alive = with_app(|app| {
        if app.epoch != epoch {
            return false;
        }
        app.draw_frame(now, &poses);
        true
    })
    .unwrap_or(false);
    if alive {
        schedule_next_frame(epoch);
    }
}

/// Load the detector, open the camera, then start the frame loop.
async fn bring_up(epoch: u64) {
    let Some((video, camera_config)) =
        with_app(|app| (app.overlay.video.clone(), app.camera_config.clone()))
    else {
        return;
    };

    let mut provider = MoveNetProvider::new();
    let opened = match provider.init().await {
        Ok(()) => Camera::open(&video, &camera_config).await,
        Err(e) => Err(e),
    };

    let started = with_app(move |app| {
        if app.epoch != epoch {
            // stopped or restarted meanwhile; the camera drops here
            return false;
        }
        match opened {
            Ok(camera) => {
                let (width, height) = camera.frame_size();
                tracing::info!(width, height, "camera ready");
                render::sync_canvas_size(&app.overlay.canvas, camera.video());
                app.camera = Some(camera);
                app.pose = Some(Rc::new(provider));
                app.load = LoadState::Ready;
                app.refresh_overlay();
                true
            }
            Err(e) => {
                tracing::error!("initialization failed: {e}");
                app.load = LoadState::Failed(e.to_string());
                app.refresh_overlay();
                false
            }
        }
    })
    .unwrap_or(false);
    if started {
        schedule_next_frame(epoch);
    }
}

/// Build the page and begin loading. Replaces a previously started game.
pub fn start() -> Result<()> {
    stop();
    let win = window().ok_or_else(|| GameError::Dom("no window".into()))?;
    let doc = win.document().ok_or_else(|| GameError::Dom("no document".into()))?;
    let epoch = EPOCH.with(|e| {
        e.set(e.get() + 1);
        e.get()
    });
    let app = App::build(doc, current_config(), epoch)?;
    app.refresh_overlay();
    APP.with(|cell| cell.replace(Some(app)));
    tracing::info!(epoch, "game page ready, loading camera and detector");
    wasm_bindgen_futures::spawn_local(bring_up(epoch));
    Ok(())
}

/// Tear everything down: frame loop, countdown, camera, DOM.
pub fn stop() {
    let Some(app) = APP.with(|cell| cell.borrow_mut().take()) else {
        return;
    };
    if let (Some(id), Some(win)) = (app.frame_id, window()) {
        win.cancel_animation_frame(id).ok();
    }
    app.overlay.remove(&app.doc);
    tracing::info!(epoch = app.epoch, "game stopped");
    drop(app);
}
