//! Anchor points that product images are attached to.
//!
//! Some anchors are plain keypoints (ears, wrists), others are derived from several keypoints
//! (the neck anchors). Derivation never fails: if a required keypoint is absent, no anchor is
//! produced for that frame and the product is simply not drawn.

use std::fmt;

use super::keypoint::{BodyPart, Keypoint, Point, Pose};

/// Names of the positions products can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Anchor {
    LeftEar,
    RightEar,
    NeckLeft,
    NeckRight,
    LeftWrist,
    RightWrist,
}

impl Anchor {
    pub fn name(self) -> &'static str {
        match self {
            Anchor::LeftEar => "leftEar",
            Anchor::RightEar => "rightEar",
            Anchor::NeckLeft => "neckLeft",
            Anchor::NeckRight => "neckRight",
            Anchor::LeftWrist => "leftWrist",
            Anchor::RightWrist => "rightWrist",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A keypoint-shaped anchor computed for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedAnchor {
    pub anchor: Anchor,
    pub score: f32,
    pub position: Point,
}

fn find(points: &[Keypoint], part: BodyPart) -> Option<&Keypoint> {
    points.iter().find(|kp| kp.part() == part)
}

fn neck(
    points: &[Keypoint],
    anchor: Anchor,
    ear: BodyPart,
    shoulder: BodyPart,
) -> Option<DerivedAnchor> {
    let nose = find(points, BodyPart::Nose)?;
    let ear = find(points, ear)?;
    let shoulder = find(points, shoulder)?;

    Some(DerivedAnchor {
        anchor,
        score: shoulder.score(),
        position: Point::new(ear.x(), shoulder.y() - (shoulder.y() - nose.y()) / 2.0),
    })
}

/// Computes the left neck anchor: horizontally below the left ear, vertically halfway between the
/// nose and the left shoulder. Its score is the shoulder's score.
pub fn neck_left(points: &[Keypoint]) -> Option<DerivedAnchor> {
    neck(points, Anchor::NeckLeft, BodyPart::LeftEar, BodyPart::LeftShoulder)
}

/// Mirror of [`neck_left`] using the right ear and shoulder.
pub fn neck_right(points: &[Keypoint]) -> Option<DerivedAnchor> {
    neck(points, Anchor::NeckRight, BodyPart::RightEar, BodyPart::RightShoulder)
}

/// Derives all secondary anchors from the top keypoints of a frame.
///
/// Returns between zero and two anchors (`neckLeft` first). A side whose inputs are incomplete is
/// left out without affecting the other side.
pub fn derive_anchors(top_points: &[Keypoint]) -> Vec<DerivedAnchor> {
    neck_left(top_points)
        .into_iter()
        .chain(neck_right(top_points))
        .collect()
}

/// Resolves any [`Anchor`] for `pose`.
///
/// Ear and neck anchors only consider the pose's top points; wrist anchors use the full keypoint
/// list since wrists come after the shoulders in the taxonomy.
pub fn resolve(pose: &Pose, anchor: Anchor) -> Option<DerivedAnchor> {
    let direct = |points: &[Keypoint], part| {
        find(points, part).map(|kp| DerivedAnchor {
            anchor,
            score: kp.score(),
            position: kp.position(),
        })
    };

    match anchor {
        Anchor::LeftEar => direct(pose.top_points(), BodyPart::LeftEar),
        Anchor::RightEar => direct(pose.top_points(), BodyPart::RightEar),
        Anchor::NeckLeft => neck_left(pose.top_points()),
        Anchor::NeckRight => neck_right(pose.top_points()),
        Anchor::LeftWrist => direct(pose.keypoints(), BodyPart::LeftWrist),
        Anchor::RightWrist => direct(pose.keypoints(), BodyPart::RightWrist),
    }
}
