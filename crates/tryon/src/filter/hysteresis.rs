//! Dead-band position filter.

use crate::body::Point;

use super::Filter;

/// Per-axis displacement thresholds of a [`Hysteresis`] filter, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub x: f32,
    pub y: f32,
}

impl Thresholds {
    /// Horizontal and vertical thresholds used for jewelry placement.
    ///
    /// Vertical head motion while wearing jewelry is larger than horizontal motion, hence the
    /// larger vertical threshold.
    pub const PLACEMENT: Self = Self { x: 10.0, y: 12.0 };

    /// # Panics
    ///
    /// Panics if either threshold is negative or NaN.
    pub fn new(x: f32, y: f32) -> Self {
        assert!(x >= 0.0 && y >= 0.0, "thresholds must be non-negative");
        Self { x, y }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::PLACEMENT
    }
}

/// A one-step hysteresis filter for 2D positions.
///
/// The filter holds on to the last committed position and only moves to a new value once it is
/// *further* than the threshold away on either axis. Small frame-to-frame noise is suppressed
/// completely, and large movements are followed without any latency.
///
/// The first value pushed is always adopted verbatim.
#[derive(Debug, Clone)]
pub struct Hysteresis {
    thresholds: Thresholds,
    committed: Option<Point>,
}

impl Hysteresis {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            committed: None,
        }
    }

    /// Returns the currently committed position, if any value was pushed yet.
    pub fn committed(&self) -> Option<Point> {
        self.committed
    }
}

impl Filter<Point> for Hysteresis {
    fn push(&mut self, value: Point) -> Point {
        match self.committed {
            Some(last)
                if (last.x - value.x).abs() <= self.thresholds.x
                    && (last.y - value.y).abs() <= self.thresholds.y =>
            {
                last
            }
            _ => {
                self.committed = Some(value);
                value
            }
        }
    }

    fn reset(&mut self) {
        self.committed = None;
    }
}
