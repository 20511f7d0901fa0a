//! Body keypoints and the anchor points derived from them.

pub mod anchor;
pub mod keypoint;

pub use anchor::{derive_anchors, resolve, Anchor, DerivedAnchor};
pub use keypoint::{BodyPart, Keypoint, Point, Pose, RawKeypoint, RawPose};
