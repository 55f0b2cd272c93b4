//! Canvas drawing: mirrored camera feed, hand markers, clap ring and fruit.

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement};

use crate::clap::ClapDetector;
use crate::error::{GameError, Result};
use crate::fruit::Fruit;
use crate::pose::PoseSnapshot;

const HAND_RADIUS: f64 = 20.0;
const HAND_COLORS: [&str; 2] = ["rgba(59, 130, 246, 0.6)", "rgba(239, 68, 68, 0.6)"];
const FRUIT_FONT: &str = "40px 'Apple Color Emoji', 'Segoe UI Emoji', Arial, sans-serif";

/// Match the canvas backing size to the video's native size.
pub fn sync_canvas_size(canvas: &HtmlCanvasElement, video: &HtmlVideoElement) {
    let (w, h) = (video.video_width(), video.video_height());
    if w == 0 || h == 0 {
        return;
    }
    if canvas.width() != w || canvas.height() != h {
        canvas.set_width(w);
        canvas.set_height(h);
    }
}

/// Draw the camera frame flipped horizontally so the player sees a mirror.
pub fn draw_video_mirrored(
    ctx: &CanvasRenderingContext2d,
    video: &HtmlVideoElement,
    width: f64,
    height: f64,
) -> Result<()> {
    ctx.save();
    let drawn = ctx
        .scale(-1.0, 1.0)
        .and_then(|_| ctx.translate(-width, 0.0))
        .and_then(|_| ctx.draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, width, height));
    ctx.restore();
    drawn.map_err(GameError::dom)
}

fn circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) -> Result<()> {
    ctx.begin_path();
    ctx.arc(x, y, r, 0.0, std::f64::consts::TAU).map_err(GameError::dom)
}

/// Hand markers plus the dashed catch ring while the hands are together.
pub fn draw_hands(
    ctx: &CanvasRenderingContext2d,
    pose: &PoseSnapshot,
    detector: &ClapDetector,
    width: f64,
) -> Result<()> {
    for (hand, color) in [pose.left_hand, pose.right_hand].iter().zip(HAND_COLORS) {
        let Some(hand) = hand else { continue };
        let p = hand.mirrored(width);
        circle(ctx, p.x, p.y, HAND_RADIUS)?;
        ctx.set_fill_style_str(color);
        ctx.fill();
        ctx.set_stroke_style_str("white");
        ctx.set_line_width(2.0);
        ctx.stroke();
    }

    if let Some(clap) = detector.clap_point(pose, width) {
        circle(ctx, clap.x, clap.y, detector.catch_radius())?;
        ctx.set_fill_style_str("rgba(255, 255, 255, 0.3)");
        ctx.fill();
        ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
        let dash = js_sys::Array::of2(&JsValue::from_f64(5.0), &JsValue::from_f64(5.0));
        ctx.set_line_dash(&dash).map_err(GameError::dom)?;
        ctx.stroke();
        ctx.set_line_dash(&js_sys::Array::new()).map_err(GameError::dom)?;
    }
    Ok(())
}

pub fn draw_fruits(ctx: &CanvasRenderingContext2d, fruits: &[Fruit]) -> Result<()> {
    ctx.set_font(FRUIT_FONT);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    for f in fruits {
        ctx.fill_text(f.emoji, f.x, f.y).map_err(GameError::dom)?;
    }
    Ok(())
}
