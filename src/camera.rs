//! Webcam capture into a hidden `<video>` element.
//!
//! The stream is owned by [`Camera`]; dropping it stops every track so the
//! device is released.

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack, window};

use crate::config::CameraConfig;
use crate::error::{GameError, Result};

pub struct Camera {
    stream: MediaStream,
    video: HtmlVideoElement,
}

fn video_constraints(cfg: &CameraConfig) -> Result<MediaStreamConstraints> {
    let video = js_sys::Object::new();
    for (key, value) in [("width", cfg.width), ("height", cfg.height), ("frameRate", cfg.frame_rate)] {
        js_sys::Reflect::set(&video, &key.into(), &value.into()).map_err(GameError::dom)?;
    }
    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&video);
    constraints.set_audio(&false.into());
    Ok(constraints)
}

impl Camera {
    /// Request the webcam and start playback into `video`.
    pub async fn open(video: &HtmlVideoElement, cfg: &CameraConfig) -> Result<Self> {
        let devices = window()
            .ok_or_else(|| GameError::Dom("no window".into()))?
            .navigator()
            .media_devices()
            .map_err(GameError::camera)?;
        let promise = devices
            .get_user_media_with_constraints(&video_constraints(cfg)?)
            .map_err(GameError::camera)?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(GameError::camera)?
            .dyn_into()
            .map_err(GameError::camera)?;

        // From here on the stream is owned, so an early return still releases it.
        let camera = Camera { stream, video: video.clone() };
        camera.video.set_muted(true);
        camera.video.set_src_object(Some(&camera.stream));
        let play = camera.video.play().map_err(GameError::camera)?;
        JsFuture::from(play).await.map_err(GameError::camera)?;
        Ok(camera)
    }

    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }

    /// Native frame size reported by the stream.
    pub fn frame_size(&self) -> (u32, u32) {
        (self.video.video_width(), self.video.video_height())
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        self.video.set_src_object(None);
        tracing::info!("camera released");
    }
}
