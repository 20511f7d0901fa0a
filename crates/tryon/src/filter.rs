//! Data filtering and smoothing.

mod ema;
mod hysteresis;

pub use ema::Ema;
pub use hysteresis::{Hysteresis, Thresholds};

/// A filter for values of type `V`.
pub trait Filter<V> {
    /// Adds a new value to the filter, returning the filtered value.
    fn push(&mut self, value: V) -> V;

    /// Resets the accumulated history and state of the filter to be identical to the state just
    /// after construction.
    fn reset(&mut self);
}
