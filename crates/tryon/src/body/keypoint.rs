//! Scored body keypoints as produced by a single-pose estimator.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A position in frame pixel coordinates (X points right, Y points down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the point halfway between `self` and `other`.
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Returns `self` moved by `(dx, dy)`.
    #[inline]
    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// The 17-part body taxonomy used by PoseNet-style estimators, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl BodyPart {
    pub const ALL: [BodyPart; 17] = {
        use BodyPart::*;
        [
            Nose,
            LeftEye,
            RightEye,
            LeftEar,
            RightEar,
            LeftShoulder,
            RightShoulder,
            LeftElbow,
            RightElbow,
            LeftWrist,
            RightWrist,
            LeftHip,
            RightHip,
            LeftKnee,
            RightKnee,
            LeftAnkle,
            RightAnkle,
        ]
    };

    /// Returns the camelCase label the estimator uses for this part.
    pub fn label(self) -> &'static str {
        match self {
            BodyPart::Nose => "nose",
            BodyPart::LeftEye => "leftEye",
            BodyPart::RightEye => "rightEye",
            BodyPart::LeftEar => "leftEar",
            BodyPart::RightEar => "rightEar",
            BodyPart::LeftShoulder => "leftShoulder",
            BodyPart::RightShoulder => "rightShoulder",
            BodyPart::LeftElbow => "leftElbow",
            BodyPart::RightElbow => "rightElbow",
            BodyPart::LeftWrist => "leftWrist",
            BodyPart::RightWrist => "rightWrist",
            BodyPart::LeftHip => "leftHip",
            BodyPart::RightHip => "rightHip",
            BodyPart::LeftKnee => "leftKnee",
            BodyPart::RightKnee => "rightKnee",
            BodyPart::LeftAnkle => "leftAnkle",
            BodyPart::RightAnkle => "rightAnkle",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing a label that is not part of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPart(pub String);

impl fmt::Display for UnknownPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown body part label '{}'", self.0)
    }
}

impl std::error::Error for UnknownPart {}

impl FromStr for BodyPart {
    type Err = UnknownPart;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyPart::ALL
            .into_iter()
            .find(|part| part.label() == s)
            .ok_or_else(|| UnknownPart(s.to_string()))
    }
}

/// A single scored keypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    part: BodyPart,
    score: f32,
    position: Point,
}

impl Keypoint {
    pub fn new(part: BodyPart, score: f32, position: Point) -> Self {
        Self {
            part,
            score,
            position,
        }
    }

    #[inline]
    pub fn part(&self) -> BodyPart {
        self.part
    }

    /// Confidence of this keypoint, by convention in range 0.0 to 1.0.
    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.position.y
    }
}

/// Number of leading keypoints (nose, eyes, ears, shoulders) that head and neck placement uses.
pub const NUM_TOP_POINTS: usize = 7;

/// A single detected pose: an overall score and keypoints in model output order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pose {
    score: f32,
    keypoints: Vec<Keypoint>,
    /// How many of `keypoints` came from the estimator's first [`NUM_TOP_POINTS`] outputs.
    num_top: usize,
}

impl Pose {
    pub fn new(score: f32, keypoints: Vec<Keypoint>) -> Self {
        let num_top = keypoints.len().min(NUM_TOP_POINTS);
        Self {
            score,
            keypoints,
            num_top,
        }
    }

    /// Overall confidence of the pose.
    #[inline]
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    /// Returns the leading head and shoulder keypoints.
    ///
    /// For poses converted from a [`RawPose`], the window covers the first [`NUM_TOP_POINTS`] wire
    /// entries, so a dropped unknown label does not pull later keypoints into it.
    pub fn top_points(&self) -> &[Keypoint] {
        &self.keypoints[..self.num_top]
    }

    /// Returns the first keypoint labeled `part`, if any.
    pub fn get(&self, part: BodyPart) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.part == part)
    }
}

/// Wire representation of a pose as emitted by the estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPose {
    pub score: f32,
    pub keypoints: Vec<RawKeypoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawKeypoint {
    pub part: String,
    pub score: f32,
    pub position: Point,
}

impl From<RawPose> for Pose {
    /// Converts a wire pose. Keypoints with labels outside the taxonomy are dropped.
    fn from(raw: RawPose) -> Self {
        let mut keypoints = Vec::with_capacity(raw.keypoints.len());
        let mut num_top = 0;
        for (index, kp) in raw.keypoints.into_iter().enumerate() {
            match kp.part.parse::<BodyPart>() {
                Ok(part) => {
                    keypoints.push(Keypoint::new(part, kp.score, kp.position));
                    if index < NUM_TOP_POINTS {
                        num_top += 1;
                    }
                }
                Err(e) => log::trace!("{e}, treating keypoint as absent"),
            }
        }
        Self {
            score: raw.score,
            keypoints,
            num_top,
        }
    }
}
