//! Pose sources feeding the session.

use std::{collections::VecDeque, fs, path::Path};

use anyhow::Context;

use crate::body::{Pose, RawPose};

/// A producer of per-frame poses, typically a pose estimator running on the camera feed.
pub trait PoseSource {
    /// Returns the pose for the next frame.
    ///
    /// `Ok(None)` means the source is exhausted.
    fn next_pose(&mut self) -> anyhow::Result<Option<Pose>>;
}

/// Replays poses recorded from an estimator.
///
/// The recording is a JSON array with one pose per frame, each shaped like the estimator's output:
///
/// ```json
/// [{ "score": 0.9, "keypoints": [{ "part": "nose", "score": 0.99, "position": { "x": 240, "y": 200 } }] }]
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordedPoses {
    poses: VecDeque<Pose>,
}

impl RecordedPoses {
    pub fn new(poses: impl IntoIterator<Item = Pose>) -> Self {
        Self {
            poses: poses.into_iter().collect(),
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let raw: Vec<RawPose> = serde_json::from_str(json)?;
        Ok(Self::new(raw.into_iter().map(Pose::from)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read poses '{}'", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid poses '{}'", path.display()))
    }

    /// Returns the number of poses left.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl PoseSource for RecordedPoses {
    fn next_pose(&mut self) -> anyhow::Result<Option<Pose>> {
        Ok(self.poses.pop_front())
    }
}
