//! Legend describing the active route coloring.
//!
//! The gradient bar is sampled from the same [`colormap`] that colors
//! segments, and the digital-input swatch uses the same
//! [`DIGITAL_INPUT_COLOR`], so the legend cannot drift from the map.

use serde::{Deserialize, Serialize};

use crate::colormap::{colormap, Rgb, DIGITAL_INPUT_COLOR};
use crate::config::ColoringConfig;
use crate::speed::{normalize, SpeedRange};
use crate::units::{speed_from_knots, SpeedUnit, Translator};
use crate::Position;

/// Number of evenly spaced stops on the gradient bar.
pub const LEGEND_STOPS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the bar in [0, 1]
    pub offset: f64,
    pub color: Rgb,
}

/// Discrete legend entry for the digital-input color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSwatch {
    pub color: Rgb,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub gradient: Vec<GradientStop>,
    /// Lower bound in the display unit, rounded
    pub min_speed: f64,
    /// Upper bound in the display unit, rounded
    pub max_speed: f64,
    pub min_label: String,
    pub max_label: String,
    pub unit_label: String,
    pub digital_input: Option<LegendSwatch>,
}

impl Legend {
    /// Text under the gradient bar, e.g. `0 - 20 kn`.
    pub fn range_label(&self) -> String {
        format!("{} - {} {}", self.min_label, self.max_label, self.unit_label)
    }

    /// CSS background for the gradient bar.
    pub fn css_gradient(&self) -> String {
        let stops: Vec<String> = self.gradient.iter().map(|s| s.color.to_css()).collect();
        format!("linear-gradient(to right, {})", stops.join(", "))
    }
}

/// Gradient stops at offsets `i / (LEGEND_STOPS - 1)`.
pub fn gradient_stops() -> Vec<GradientStop> {
    (0..LEGEND_STOPS)
        .map(|i| {
            let offset = i as f64 / (LEGEND_STOPS - 1) as f64;
            GradientStop {
                offset,
                color: colormap(offset),
            }
        })
        .collect()
}

// Half-up rounding for display labels
fn round_label(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Human-readable index of a digital input: `in2` becomes `2`, other
/// names are kept as they are.
pub fn digital_input_index(name: &str) -> &str {
    match name.strip_prefix("in") {
        Some(index) if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) => index,
        _ => name,
    }
}

/// Build the legend for a speed range.
///
/// Returns `None` when there is nothing to describe: the range is empty or
/// its maximum speed is not positive.
pub fn build_legend<T: Translator + ?Sized>(
    config: &ColoringConfig,
    range: &SpeedRange,
    unit: SpeedUnit,
    t: &T,
) -> Option<Legend> {
    if range.is_empty() || !(range.max > 0.0) {
        return None;
    }

    let min_speed = round_label(speed_from_knots(range.min, unit));
    let max_speed = round_label(speed_from_knots(range.max, unit));

    let digital_input = config.digital_input().map(|name| LegendSwatch {
        color: DIGITAL_INPUT_COLOR,
        label: format!(
            "{} {} {}",
            t.translate("positionInput"),
            digital_input_index(name),
            t.translate("legendDigitalInputActive")
        ),
    });

    Some(Legend {
        gradient: gradient_stops(),
        min_speed,
        max_speed,
        min_label: format!("{}", min_speed as i64),
        max_label: format!("{}", max_speed as i64),
        unit_label: t.translate(unit.label_key()),
        digital_input,
    })
}

/// Build the legend for a route. Routes with fewer than two positions draw
/// no segments and get no legend.
pub fn legend_for_route<T: Translator + ?Sized>(
    positions: &[Position],
    config: &ColoringConfig,
    unit: SpeedUnit,
    t: &T,
) -> Option<Legend> {
    if positions.len() < 2 {
        return None;
    }
    build_legend(config, &normalize(positions), unit, t)
}
