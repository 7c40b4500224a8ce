//! GeoJSON output for map layers.
//!
//! Segments become `LineString` features whose properties carry the paint
//! values (`color`, `width`, `opacity`) a line layer reads per feature.

use serde::{Deserialize, Serialize};

use crate::segments::Segment;

/// Per-feature paint values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentProperties {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

/// A two-point line, coordinates as `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "LineString")]
pub struct LineGeometry {
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: LineGeometry,
    pub properties: SegmentProperties,
}

impl From<&Segment> for Feature {
    fn from(segment: &Segment) -> Self {
        let (start, end) = (segment.line.start, segment.line.end);
        Feature {
            geometry: LineGeometry {
                coordinates: vec![[start.x, start.y], [end.x, end.y]],
            },
            properties: SegmentProperties {
                color: segment.color.to_css(),
                width: segment.width,
                opacity: segment.opacity,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// One feature per segment, in segment order.
    pub fn from_segments(segments: &[Segment]) -> Self {
        Self {
            features: segments.iter().map(Feature::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
