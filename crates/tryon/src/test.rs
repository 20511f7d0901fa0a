use std::{fs, path::PathBuf};

use tempfile::TempDir;
use tryon_image::Image;

use crate::body::{BodyPart, Keypoint, Point, Pose};

/// Saves `image` as `name` inside `dir` and returns its path.
pub fn write_png(dir: &TempDir, name: &str, image: &Image) -> PathBuf {
    let path = dir.path().join(name);
    image.save(&path).unwrap();
    path
}

pub fn write_bytes(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    path
}

/// A mirrored frontal upper-body pose in a 480x640 frame, every keypoint scored `part_score`.
pub fn frontal_pose(pose_score: f32, part_score: f32) -> Pose {
    let positions = [
        (BodyPart::Nose, 240.0, 200.0),
        (BodyPart::LeftEye, 220.0, 180.0),
        (BodyPart::RightEye, 260.0, 180.0),
        (BodyPart::LeftEar, 200.0, 150.0),
        (BodyPart::RightEar, 280.0, 150.0),
        (BodyPart::LeftShoulder, 150.0, 320.0),
        (BodyPart::RightShoulder, 330.0, 320.0),
        (BodyPart::LeftElbow, 130.0, 420.0),
        (BodyPart::RightElbow, 350.0, 420.0),
        (BodyPart::LeftWrist, 120.0, 510.0),
        (BodyPart::RightWrist, 360.0, 510.0),
    ];
    Pose::new(
        pose_score,
        positions
            .into_iter()
            .map(|(part, x, y)| Keypoint::new(part, part_score, Point::new(x, y)))
            .collect(),
    )
}
