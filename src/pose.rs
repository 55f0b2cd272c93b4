//! Pose source seam and wrist tracking.
//!
//! A [`PoseProvider`] turns a video frame into zero or more skeletons. The game
//! only ever looks at the first skeleton, and within it only at the two wrist
//! keypoints, which [`HandTracker`] turns into a [`PoseSnapshot`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use web_sys::HtmlVideoElement;

use crate::error::Result;
use crate::geometry::Point;

pub const LEFT_WRIST: &str = "left_wrist";
pub const RIGHT_WRIST: &str = "right_wrist";

/// Named landmark as reported by the detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One detected skeleton.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedPose {
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

impl DetectedPose {
    pub fn keypoint(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name.as_deref() == Some(name))
    }
}

/// Hand positions for the current frame, in raw (un-mirrored) video pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PoseSnapshot {
    pub left_hand: Option<Point>,
    pub right_hand: Option<Point>,
}

impl PoseSnapshot {
    pub fn both_hands(&self) -> Option<(Point, Point)> {
        Some((self.left_hand?, self.right_hand?))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HandTracker {
    min_confidence: f64,
}

impl HandTracker {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// Build a snapshot from the detector output. No temporal filtering: each
    /// call fully replaces the previous snapshot.
    pub fn track(&self, poses: &[DetectedPose]) -> PoseSnapshot {
        let Some(pose) = poses.first() else {
            return PoseSnapshot::default();
        };
        PoseSnapshot {
            left_hand: self.accept(pose.keypoint(LEFT_WRIST)),
            right_hand: self.accept(pose.keypoint(RIGHT_WRIST)),
        }
    }

    fn accept(&self, kp: Option<&Keypoint>) -> Option<Point> {
        let kp = kp?;
        // missing score counts as zero confidence
        (kp.score.unwrap_or(0.0) > self.min_confidence).then(|| Point::new(kp.x, kp.y))
    }
}

/// Parse the JSON form of a detector result (`[{keypoints: [...]}, ...]`).
pub fn parse_poses(json: &str) -> serde_json::Result<Vec<DetectedPose>> {
    serde_json::from_str(json)
}

/// Pluggable pose-estimation backend.
#[async_trait(?Send)]
pub trait PoseProvider {
    fn name(&self) -> &str;

    /// Load the model / runtime. Must succeed before `estimate` is called.
    async fn init(&mut self) -> Result<()>;

    async fn estimate(&self, video: &HtmlVideoElement) -> Result<Vec<DetectedPose>>;
}
