//! Turbo-style colormap used for speed coloring.
//!
//! Maps a normalized value in [0, 1] to an RGB color, going from dark blue
//! through cyan, green and yellow to dark red. The curve is a piecewise-linear
//! interpolation over a fixed control-point table sampled from the Turbo
//! colormap, so the same input always yields the same color.
//!
//! ## Example
//! ```rust
//! use route_colors::colormap::{colormap, Rgb};
//!
//! assert_eq!(colormap(0.0), Rgb::new(48, 18, 59));
//! assert_eq!(colormap(-3.0), colormap(0.0)); // clamped, not rejected
//! println!("{}", colormap(0.5).to_css()); // rgb(149, 251, 81)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS functional notation, e.g. `rgb(149, 251, 81)`.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Lowercase hex notation, e.g. `#ff00ff`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Reserved color for segments whose end position has the configured
/// digital input active.
///
/// Saturated magenta: high red and high blue together never occur on the
/// colormap, so it cannot be confused with any speed.
pub const DIGITAL_INPUT_COLOR: Rgb = Rgb::new(255, 0, 255);

/// Control points (offset, color), evenly spaced and sorted by offset.
const TURBO_STOPS: [(f64, Rgb); 11] = [
    (0.0, Rgb::new(48, 18, 59)),    // Dark blue
    (0.1, Rgb::new(74, 88, 221)),   // Blue
    (0.2, Rgb::new(47, 157, 245)),  // Light blue
    (0.3, Rgb::new(39, 215, 196)),  // Cyan
    (0.4, Rgb::new(77, 248, 132)),  // Green
    (0.5, Rgb::new(149, 251, 81)),  // Yellow-green
    (0.6, Rgb::new(222, 221, 50)),  // Yellow
    (0.7, Rgb::new(255, 164, 35)),  // Orange
    (0.8, Rgb::new(246, 95, 24)),   // Red-orange
    (0.9, Rgb::new(186, 34, 8)),    // Red
    (1.0, Rgb::new(122, 4, 3)),     // Dark red
];

/// Color at the cold end of the map (`t = 0`).
pub const COLORMAP_START: Rgb = TURBO_STOPS[0].1;

/// Color at the hot end of the map (`t = 1`).
pub const COLORMAP_END: Rgb = TURBO_STOPS[TURBO_STOPS.len() - 1].1;

#[inline]
fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let v = a as f64 + (b as f64 - a as f64) * t;
    v.round().clamp(0.0, 255.0) as u8
}

/// Sample the colormap at `t`.
///
/// `t` is clamped to [0, 1] first; NaN is treated as 0.
pub fn colormap(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    if t <= TURBO_STOPS[0].0 {
        return COLORMAP_START;
    }
    if t >= TURBO_STOPS[TURBO_STOPS.len() - 1].0 {
        return COLORMAP_END;
    }

    for pair in TURBO_STOPS.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t >= t0 && t <= t1 {
            let local_t = (t - t0) / (t1 - t0);
            return Rgb::new(
                lerp_channel(c0.r, c1.r, local_t),
                lerp_channel(c0.g, c1.g, local_t),
                lerp_channel(c0.b, c1.b, local_t),
            );
        }
    }

    COLORMAP_END
}
