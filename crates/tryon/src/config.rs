//! Session configuration.

use std::{env, fmt::Display, str::FromStr};

use anyhow::Context;

use crate::filter::Thresholds;

/// Tunables of a try-on session.
///
/// The defaults suit a 480x640 portrait webcam feed. Every field can be overridden with a
/// `TRYON_*` environment variable via [`Config::from_env`]; see the crate documentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Width of the video frame and drawing surface, in pixels.
    pub frame_width: u32,
    /// Height of the video frame and drawing surface, in pixels.
    pub frame_height: u32,
    /// Poses scoring below this are not decorated.
    pub min_pose_confidence: f32,
    /// Anchors need a score *above* this to be drawn at.
    pub min_part_confidence: f32,
    /// Placement smoothing thresholds.
    pub smoothing: Thresholds,
    /// Draw markers on the keypoints and anchors used for placement.
    pub draw_keypoints: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_width: 480,
            frame_height: 640,
            min_pose_confidence: 0.1,
            min_part_confidence: 0.5,
            smoothing: Thresholds::PLACEMENT,
            draw_keypoints: false,
        }
    }
}

impl Config {
    /// Creates the default configuration with overrides from the process environment applied.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates the default configuration with overrides from `lookup` applied.
    ///
    /// `lookup` is called with variable names like `TRYON_FRAME_WIDTH` and returns their value, if
    /// set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        override_with(&lookup, "TRYON_FRAME_WIDTH", &mut config.frame_width)?;
        override_with(&lookup, "TRYON_FRAME_HEIGHT", &mut config.frame_height)?;
        override_with(
            &lookup,
            "TRYON_MIN_POSE_CONFIDENCE",
            &mut config.min_pose_confidence,
        )?;
        override_with(
            &lookup,
            "TRYON_MIN_PART_CONFIDENCE",
            &mut config.min_part_confidence,
        )?;
        let (mut x, mut y) = (config.smoothing.x, config.smoothing.y);
        override_with(&lookup, "TRYON_SMOOTHING_X", &mut x)?;
        override_with(&lookup, "TRYON_SMOOTHING_Y", &mut y)?;
        if !(x >= 0.0 && y >= 0.0) {
            anyhow::bail!("smoothing thresholds must be non-negative (got {x}, {y})");
        }
        config.smoothing = Thresholds::new(x, y);

        if let Some(value) = lookup("TRYON_DRAW_KEYPOINTS") {
            config.draw_keypoints = match value.trim() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => anyhow::bail!("invalid value '{other}' for TRYON_DRAW_KEYPOINTS"),
            };
        }

        log::debug!("configuration: {config:?}");
        Ok(config)
    }
}

fn override_with<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
) -> anyhow::Result<()>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(value) = lookup(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value '{value}' for {name}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.frame_width, 480);
        assert_eq!(config.frame_height, 640);
        assert_eq!(config.smoothing, Thresholds { x: 10.0, y: 12.0 });
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            ("TRYON_MIN_POSE_CONFIDENCE", "0.25"),
            ("TRYON_SMOOTHING_Y", " 20 "),
            ("TRYON_DRAW_KEYPOINTS", "true"),
        ]))
        .unwrap();
        assert_eq!(config.min_pose_confidence, 0.25);
        assert_eq!(config.smoothing, Thresholds { x: 10.0, y: 20.0 });
        assert!(config.draw_keypoints);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = Config::from_lookup(lookup(&[("TRYON_FRAME_WIDTH", "wide")])).unwrap_err();
        assert!(format!("{err:#}").contains("TRYON_FRAME_WIDTH"));

        let err = Config::from_lookup(lookup(&[("TRYON_DRAW_KEYPOINTS", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("TRYON_DRAW_KEYPOINTS"));

        assert!(Config::from_lookup(lookup(&[("TRYON_SMOOTHING_X", "-1")])).is_err());
    }
}
