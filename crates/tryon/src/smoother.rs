//! Jitter suppression for overlay placement.

use std::collections::HashMap;

use crate::{
    body::{Anchor, Point},
    filter::{Filter, Hysteresis, Thresholds},
};

/// Remembers the last committed position of every anchor and suppresses small movements.
///
/// One [`PlacementSmoother`] is created per session and fed from the frame loop. Anchors are only
/// committed once they have been observed with sufficient confidence; frames in which an anchor is
/// not eligible leave its cached position untouched.
#[derive(Debug, Clone)]
pub struct PlacementSmoother {
    thresholds: Thresholds,
    filters: HashMap<Anchor, Hysteresis>,
}

impl Default for PlacementSmoother {
    fn default() -> Self {
        Self::new(Thresholds::PLACEMENT)
    }
}

impl PlacementSmoother {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            filters: HashMap::new(),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Commits a candidate position for `anchor` and returns the position to draw at.
    ///
    /// The first commit for an anchor is adopted as-is. Afterwards, the cached position is only
    /// replaced if the candidate is more than the threshold away horizontally *or* vertically.
    pub fn commit(&mut self, anchor: Anchor, candidate: Point) -> Point {
        let thresholds = self.thresholds;
        let effective = self
            .filters
            .entry(anchor)
            .or_insert_with(|| Hysteresis::new(thresholds))
            .push(candidate);
        if effective != candidate {
            log::trace!("{anchor}: holding {effective:?} (candidate {candidate:?})");
        }
        effective
    }

    /// Returns the cached position of `anchor` without committing anything.
    pub fn get(&self, anchor: Anchor) -> Option<Point> {
        self.filters.get(&anchor).and_then(|f| f.committed())
    }

    /// Number of anchors with a cached position.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
