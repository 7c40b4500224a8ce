//! Speed range aggregation and normalization.
//!
//! A route's speed range is the min/max speed over all of its positions.
//! Speeds are scaled linearly into [0, 1] against that range before the
//! colormap lookup.

use serde::{Deserialize, Serialize};

use crate::Position;

/// Normalized value used when the range has no width (all speeds equal,
/// a single position, or no positions at all).
pub const DEGENERATE_SCALE: f64 = 0.0;

/// Minimum and maximum speed (knots) observed on a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

impl SpeedRange {
    /// The range of an empty route: `min = +inf`, `max = -inf`.
    pub fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// True when no speed has been observed.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// True when scaling against this range would divide by zero.
    pub fn is_degenerate(&self) -> bool {
        self.is_empty() || self.max == self.min || !(self.max - self.min).is_finite()
    }

    /// Extend the range with one more speed sample. NaN samples are ignored.
    pub fn include(&mut self, speed: f64) {
        self.min = self.min.min(speed);
        self.max = self.max.max(speed);
    }
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self::empty()
    }
}

/// Scan all positions once and return their speed range.
pub fn normalize(positions: &[Position]) -> SpeedRange {
    let mut range = SpeedRange::empty();
    for p in positions {
        range.include(p.speed);
    }
    range
}

/// Scale `speed` into [0, 1] against `range`.
///
/// Returns [`DEGENERATE_SCALE`] when the range has no width instead of
/// dividing by zero. Speeds outside the range are clamped.
pub fn scale(speed: f64, range: &SpeedRange) -> f64 {
    if range.is_degenerate() || speed.is_nan() {
        return DEGENERATE_SCALE;
    }
    ((speed - range.min) / (range.max - range.min)).clamp(0.0, 1.0)
}
