//! Pose-driven jewelry try-on.
//!
//! Takes per-frame body poses from an external estimator and composites product images (earrings,
//! necklaces, bracelets) onto the mirrored camera frame at anchor points derived from the pose.
//!
//! # Coordinates
//!
//! Poses and placements use frame pixel coordinates: X points to the right, Y points *down*, and
//! the origin is the top left corner of the (unmirrored) camera frame.
//!
//! # Environment Variables
//!
//! [`Config::from_env`] overrides the default configuration with these variables:
//!
//! * `TRYON_FRAME_WIDTH`, `TRYON_FRAME_HEIGHT`: size of the output surface in pixels.
//! * `TRYON_MIN_POSE_CONFIDENCE`: poses scoring below this are not decorated.
//! * `TRYON_MIN_PART_CONFIDENCE`: anchors must score above this to be drawn.
//! * `TRYON_SMOOTHING_X`, `TRYON_SMOOTHING_Y`: placement hysteresis thresholds in pixels.
//! * `TRYON_DRAW_KEYPOINTS`: set to `1` to draw debug markers on keypoints and neck anchors.
//!
//! [`Config::from_env`]: config::Config::from_env

use log::LevelFilter;

pub mod body;
pub mod compositor;
pub mod config;
pub mod filter;
pub mod product;
pub mod session;
pub mod smoother;
pub mod source;
pub mod surface;
pub mod timer;

#[cfg(test)]
mod test;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .filter(Some("tryon_image"), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this library log at *debug* level unless `RUST_LOG` says otherwise.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
