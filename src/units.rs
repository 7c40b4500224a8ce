//! Speed unit conversion and label translation for the legend.
//!
//! Positions carry speed in knots. The legend shows bounds in the user's
//! preferred unit with a localized unit label.

use serde::{Deserialize, Serialize};

/// Display unit for speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedUnit {
    #[default]
    #[serde(rename = "kn")]
    Knots,
    #[serde(rename = "kmh")]
    Kmh,
    #[serde(rename = "mph")]
    Mph,
}

impl SpeedUnit {
    /// Parse a preference value (`"kn"`, `"kmh"`, `"mph"`). Unknown values fall
    /// back to knots.
    pub fn from_preference(value: &str) -> Self {
        match value {
            "kmh" => SpeedUnit::Kmh,
            "mph" => SpeedUnit::Mph,
            _ => SpeedUnit::Knots,
        }
    }

    /// Translation key for the unit label.
    pub fn label_key(&self) -> &'static str {
        match self {
            SpeedUnit::Knots => "sharedKn",
            SpeedUnit::Kmh => "sharedKmh",
            SpeedUnit::Mph => "sharedMph",
        }
    }

    fn factor(&self) -> f64 {
        match self {
            SpeedUnit::Knots => 1.0,
            SpeedUnit::Kmh => 1.852,
            SpeedUnit::Mph => 1.15078,
        }
    }
}

/// Convert a speed in knots to `unit`.
pub fn speed_from_knots(knots: f64, unit: SpeedUnit) -> f64 {
    knots * unit.factor()
}

/// Source of localized UI strings, keyed like the web client's bundles.
pub trait Translator {
    fn translate(&self, key: &str) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

/// English labels for the keys the legend uses. Unknown keys are returned as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLabels;

impl Translator for DefaultLabels {
    fn translate(&self, key: &str) -> String {
        match key {
            "sharedKn" => "kn",
            "sharedKmh" => "km/h",
            "sharedMph" => "mph",
            "positionInput" => "Input",
            "legendDigitalInputActive" => "active",
            other => other,
        }
        .to_string()
    }
}
