//! # Route Colors
//!
//! Styling engine for historical GPS route paths on a map.
//!
//! This library provides:
//! - A Turbo-style colormap for speed coloring
//! - Per-segment color resolution (digital input, fixed device color, speed)
//! - GeoJSON line-segment features ready for a map layer
//! - A legend that always agrees with the segment colors
//! - A map layer binding with scoped, idempotent teardown
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel segment building with rayon
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_colors::{build_segments, ColoringConfig, Position, StyleConfig};
//!
//! let positions = vec![
//!     Position::new(51.5074, -0.1278, 0.0),
//!     Position::new(51.5080, -0.1290, 10.0),
//!     Position::new(51.5090, -0.1300, 20.0),
//! ];
//!
//! let segments = build_segments(&positions, &ColoringConfig::default(), &StyleConfig::default());
//! assert_eq!(segments.len(), 2);
//! for segment in &segments {
//!     println!("{} -> {}: {}", segment.from, segment.to, segment.color.to_css());
//! }
//! ```

use geo::Coord;
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, RouteColorError};

// Speed colormap
pub mod colormap;
pub use colormap::{colormap, Rgb, DIGITAL_INPUT_COLOR};

// Speed range and normalization
pub mod speed;
pub use speed::{normalize, scale, SpeedRange};

// Unit conversion and label translation
pub mod units;
pub use units::{speed_from_knots, DefaultLabels, SpeedUnit, Translator};

// Device attribute and preference configuration
pub mod config;
pub use config::{ColoringConfig, StyleConfig};

// Segment color resolution
pub mod resolve;
pub use resolve::{resolve_color, SegmentColor};

// Route-to-segments transformation
pub mod segments;
#[cfg(feature = "parallel")]
pub use segments::build_segments_parallel;
pub use segments::{build_segments, route_bounds, RouteBounds, Segment};

// GeoJSON feature output
pub mod geojson;
pub use geojson::{Feature, FeatureCollection};

// Legend construction
pub mod legend;
pub use legend::{build_legend, legend_for_route, GradientStop, Legend, LegendSwatch};

// Map surface binding
pub mod layer;
pub use layer::{LayerSpec, MapSurface, MemorySurface, RouteLayer};

// Stateful route view (singleton with the selected route)
pub mod view;
pub use view::{with_route_view, RouteView, ROUTE_VIEW};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("RouteColorsRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// Per-position signal values keyed by signal name (e.g. `"in1"`, `"ignition"`).
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// A recorded position of a device.
///
/// Positions are produced by the report layer and only read here. A route is
/// an ordered, time-sorted slice of positions; order defines which positions
/// form a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default)]
    pub device_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Speed in knots
    #[serde(default)]
    pub speed: f64,
    /// Fix time as reported by the server (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_time: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Position {
    /// Create a position with no device, timestamp or attributes.
    pub fn new(latitude: f64, longitude: f64, speed: f64) -> Self {
        Self {
            device_id: 0,
            latitude,
            longitude,
            speed,
            fix_time: None,
            attributes: Attributes::new(),
        }
    }

    /// Set the owning device.
    pub fn with_device(mut self, device_id: i64) -> Self {
        self.device_id = device_id;
        self
    }

    /// Set a signal value.
    pub fn with_attribute(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Map coordinate (x = longitude, y = latitude).
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }

    /// Check if the position has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// The position that stands for the whole route when reading per-device
/// settings: the first element, or `None` for an empty route.
pub fn representative_position(positions: &[Position]) -> Option<&Position> {
    positions.first()
}

// ============================================================================
// Tests
// ============================================================================
