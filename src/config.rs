//! Coloring and style configuration.
//!
//! [`ColoringConfig`] comes from the attributes of the device that owns the
//! route. [`StyleConfig`] comes from user preferences. Both are fixed for the
//! duration of one render.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::units::SpeedUnit;
use crate::{representative_position, Attributes, Position};

/// Device attribute holding a fixed CSS color for all segments.
pub const ATTR_REPORT_COLOR: &str = "web.reportColor";
/// Device attribute enabling digital-input coloring.
pub const ATTR_COLOR_BY_DIGITAL_INPUT: &str = "web.colorByDigitalInput";
/// Device attribute naming the position attribute to watch.
pub const ATTR_COLOR_BY_DIGITAL_INPUT_NAME: &str = "web.colorByDigitalInputName";

/// Preference key for line width.
pub const PREF_LINE_WIDTH: &str = "mapLineWidth";
/// Preference key for line opacity.
pub const PREF_LINE_OPACITY: &str = "mapLineOpacity";
/// Preference key for the speed unit.
pub const PREF_SPEED_UNIT: &str = "speedUnit";

/// How segments of one route are colored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColoringConfig {
    /// Fixed color for every segment (CSS string), used verbatim
    pub report_color: Option<String>,
    /// Whether an active digital input overrides the segment color
    pub color_by_digital_input_enabled: bool,
    /// Position attribute holding the digital input state (e.g. "in1")
    pub color_by_digital_input_name: Option<String>,
}

impl ColoringConfig {
    /// Read the coloring settings from a device's attributes.
    ///
    /// Empty strings count as unset. The enable flag accepts JSON `true` or the
    /// string `"true"`; any other value leaves it off.
    pub fn from_device_attributes(attributes: &Attributes) -> Self {
        let report_color = non_empty_string(attributes.get(ATTR_REPORT_COLOR));
        let color_by_digital_input_enabled = match attributes.get(ATTR_COLOR_BY_DIGITAL_INPUT) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(other) => {
                debug!(
                    "[ColoringConfig] Ignoring non-boolean {}: {}",
                    ATTR_COLOR_BY_DIGITAL_INPUT, other
                );
                false
            }
            None => false,
        };
        let color_by_digital_input_name =
            non_empty_string(attributes.get(ATTR_COLOR_BY_DIGITAL_INPUT_NAME));

        Self {
            report_color,
            color_by_digital_input_enabled,
            color_by_digital_input_name,
        }
    }

    /// Settings for a route, read from the device of its representative
    /// position. An empty route or an unknown device gives the default.
    pub fn for_route(positions: &[Position], devices: &HashMap<i64, Attributes>) -> Self {
        representative_position(positions)
            .and_then(|p| devices.get(&p.device_id))
            .map(Self::from_device_attributes)
            .unwrap_or_default()
    }

    /// The watched attribute name, if digital-input coloring is active.
    pub fn digital_input(&self) -> Option<&str> {
        if !self.color_by_digital_input_enabled {
            return None;
        }
        self.color_by_digital_input_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// The fixed segment color, if one is set.
    pub fn fixed_color(&self) -> Option<&str> {
        self.report_color.as_deref().filter(|c| !c.is_empty())
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Line styling applied to every segment, plus the legend's display unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    /// Line width in pixels.
    /// Default: 2.0
    pub line_width: f64,

    /// Line opacity in [0, 1].
    /// Default: 1.0
    pub line_opacity: f64,

    /// Unit for legend bounds.
    /// Default: knots
    pub speed_unit: SpeedUnit,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            line_opacity: 1.0,
            speed_unit: SpeedUnit::Knots,
        }
    }
}

impl StyleConfig {
    /// Build from user preferences. Missing or non-numeric values fall back to
    /// the defaults; opacity is clamped to [0, 1].
    pub fn from_preferences(preferences: &Attributes) -> Self {
        let defaults = Self::default();

        let line_width = preferences
            .get(PREF_LINE_WIDTH)
            .and_then(number)
            .filter(|w| *w >= 0.0)
            .unwrap_or(defaults.line_width);
        let line_opacity = preferences
            .get(PREF_LINE_OPACITY)
            .and_then(number)
            .map(|o| o.clamp(0.0, 1.0))
            .unwrap_or(defaults.line_opacity);
        let speed_unit = preferences
            .get(PREF_SPEED_UNIT)
            .and_then(Value::as_str)
            .map(SpeedUnit::from_preference)
            .unwrap_or(defaults.speed_unit);

        Self {
            line_width,
            line_opacity,
            speed_unit,
        }
    }

    /// Opacity clamped to [0, 1].
    pub fn opacity(&self) -> f64 {
        if self.line_opacity.is_nan() {
            return 1.0;
        }
        self.line_opacity.clamp(0.0, 1.0)
    }
}

// Preferences arrive as numbers or numeric strings
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
