//! Per-segment color resolution.
//!
//! Each segment is colored from its end position (the point the vehicle moves
//! into). The first matching rule wins:
//!
//! 1. Digital-input coloring is enabled with a signal name, and the end
//!    position's attribute of that name is boolean `true`:
//!    [`DIGITAL_INPUT_COLOR`].
//! 2. The device has a fixed report color: that color, verbatim.
//! 3. Otherwise: the colormap at the end position's scaled speed.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::colormap::{colormap, Rgb, DIGITAL_INPUT_COLOR};
use crate::config::ColoringConfig;
use crate::speed::{scale, SpeedRange};
use crate::Position;

/// The color chosen for one segment, tagged with the rule that chose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentColor {
    /// Configured digital input is active at the end position
    DigitalInput,
    /// Device-level fixed color (CSS string, passed through untouched)
    Fixed(String),
    /// Colormap sample for the end position's speed
    Speed(Rgb),
}

impl SegmentColor {
    /// CSS color string for the map paint rule.
    pub fn to_css(&self) -> String {
        match self {
            SegmentColor::DigitalInput => DIGITAL_INPUT_COLOR.to_css(),
            SegmentColor::Fixed(color) => color.clone(),
            SegmentColor::Speed(rgb) => rgb.to_css(),
        }
    }
}

impl Serialize for SegmentColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

/// True only when the attribute is present and exactly boolean `true`.
/// Missing values, `false`, `1` and `"true"` all count as inactive.
pub fn is_digital_input_active(position: &Position, name: &str) -> bool {
    matches!(position.attributes.get(name), Some(Value::Bool(true)))
}

/// Resolve the color of the segment ending at `end`.
pub fn resolve_color(end: &Position, config: &ColoringConfig, range: &SpeedRange) -> SegmentColor {
    if let Some(name) = config.digital_input() {
        if is_digital_input_active(end, name) {
            return SegmentColor::DigitalInput;
        }
    }

    if let Some(color) = config.fixed_color() {
        return SegmentColor::Fixed(color.to_string());
    }

    SegmentColor::Speed(colormap(scale(end.speed, range)))
}
