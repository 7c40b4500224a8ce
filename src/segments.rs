//! Route-to-segments transformation.
//!
//! A route of N positions becomes N-1 segments, one per adjacent pair, in
//! route order. Every call rebuilds the full list: a single changed input
//! (for example toggling digital-input coloring) can recolor the whole route.

use geo::{BoundingRect, Line, MultiPoint, Point};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{ColoringConfig, StyleConfig};
use crate::resolve::{resolve_color, SegmentColor};
use crate::speed::{normalize, SpeedRange};
use crate::Position;

/// Routes shorter than this are built sequentially even with `parallel`.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_POSITIONS: usize = 10_000;

/// One drawn line between two chronologically adjacent positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Index of the start position in the route
    pub from: usize,
    /// Index of the end position (always `from + 1`)
    pub to: usize,
    /// Geometry in map coordinates (x = longitude, y = latitude)
    pub line: Line<f64>,
    pub color: SegmentColor,
    pub width: f64,
    pub opacity: f64,
}

fn make_segment(
    from: usize,
    pair: &[Position],
    config: &ColoringConfig,
    style: &StyleConfig,
    range: &SpeedRange,
) -> Segment {
    let (start, end) = (&pair[0], &pair[1]);
    Segment {
        from,
        to: from + 1,
        line: Line::new(start.coord(), end.coord()),
        // Colored by the end point, never the start
        color: resolve_color(end, config, range),
        width: style.line_width,
        opacity: style.opacity(),
    }
}

/// Build the styled segments of a route.
///
/// Fewer than two positions yield an empty list.
pub fn build_segments(
    positions: &[Position],
    config: &ColoringConfig,
    style: &StyleConfig,
) -> Vec<Segment> {
    let range = normalize(positions);
    build_segments_in_range(positions, config, style, &range)
}

/// Build segments against a precomputed speed range.
pub fn build_segments_in_range(
    positions: &[Position],
    config: &ColoringConfig,
    style: &StyleConfig,
    range: &SpeedRange,
) -> Vec<Segment> {
    if positions.len() < 2 {
        return Vec::new();
    }

    positions
        .windows(2)
        .enumerate()
        .map(|(i, pair)| make_segment(i, pair, config, style, range))
        .collect()
}

/// Build segments using parallel processing.
/// Output is identical to [`build_segments`], including order.
#[cfg(feature = "parallel")]
pub fn build_segments_parallel(
    positions: &[Position],
    config: &ColoringConfig,
    style: &StyleConfig,
) -> Vec<Segment> {
    if positions.len() < PARALLEL_MIN_POSITIONS {
        // Fall back to sequential for short routes
        return build_segments(positions, config, style);
    }

    let range = positions
        .par_iter()
        .fold(SpeedRange::empty, |mut r, p| {
            r.include(p.speed);
            r
        })
        .reduce(SpeedRange::empty, |a, b| SpeedRange {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        });

    positions
        .par_windows(2)
        .enumerate()
        .map(|(i, pair)| make_segment(i, pair, config, style, &range))
        .collect()
}

/// Bounding box of a route, for fitting the map camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl RouteBounds {
    /// Center as (latitude, longitude).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Bounds of all valid positions, or `None` if there are none.
pub fn route_bounds(positions: &[Position]) -> Option<RouteBounds> {
    let points: MultiPoint<f64> = positions
        .iter()
        .filter(|p| p.is_valid())
        .map(|p| Point::from(p.coord()))
        .collect::<Vec<_>>()
        .into();

    let rect = points.bounding_rect()?;
    Some(RouteBounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::colormap;
    use geo::Coord;

    fn sample_route(speeds: &[f64]) -> Vec<Position> {
        speeds
            .iter()
            .enumerate()
            .map(|(i, &s)| Position::new(51.5074 + i as f64 * 0.001, -0.1278, s))
            .collect()
    }

    #[test]
    fn test_segment_count() {
        let config = ColoringConfig::default();
        let style = StyleConfig::default();
        for n in 0..6 {
            let route = sample_route(&vec![1.0; n]);
            let segments = build_segments(&route, &config, &style);
            assert_eq!(segments.len(), n.saturating_sub(1));
        }
    }

    #[test]
    fn test_segments_follow_route_order() {
        let route = sample_route(&[0.0, 5.0, 10.0, 15.0]);
        let segments = build_segments(&route, &ColoringConfig::default(), &StyleConfig::default());

        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.from, i);
            assert_eq!(segment.to, i + 1);
            assert_eq!(segment.line.start, route[i].coord());
            assert_eq!(segment.line.end, route[i + 1].coord());
        }
    }

    #[test]
    fn test_color_comes_from_end_position() {
        let route = sample_route(&[0.0, 10.0, 20.0]);
        let segments = build_segments(&route, &ColoringConfig::default(), &StyleConfig::default());

        assert_eq!(segments[0].color, SegmentColor::Speed(colormap(0.5)));
        assert_eq!(segments[1].color, SegmentColor::Speed(colormap(1.0)));
    }

    #[test]
    fn test_style_applied_to_every_segment() {
        let route = sample_route(&[0.0, 10.0, 20.0]);
        let style = StyleConfig {
            line_width: 4.5,
            line_opacity: 0.6,
            ..StyleConfig::default()
        };
        let segments = build_segments(&route, &ColoringConfig::default(), &style);
        assert!(segments.iter().all(|s| s.width == 4.5 && s.opacity == 0.6));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let route = sample_route(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        let config = ColoringConfig::default();
        let style = StyleConfig::default();
        assert_eq!(
            build_segments(&route, &config, &style),
            build_segments(&route, &config, &style)
        );
    }

    #[test]
    fn test_route_bounds() {
        let route = vec![
            Position::new(51.0, -1.0, 0.0),
            Position::new(52.0, 0.5, 0.0),
            Position::new(f64::NAN, 10.0, 0.0),
        ];
        let bounds = route_bounds(&route).unwrap();
        assert_eq!(bounds.min_lat, 51.0);
        assert_eq!(bounds.max_lat, 52.0);
        assert_eq!(bounds.min_lng, -1.0);
        assert_eq!(bounds.max_lng, 0.5);
        assert_eq!(bounds.center(), (51.5, -0.25));

        assert!(route_bounds(&[]).is_none());
    }

    #[test]
    fn test_line_geometry_is_lon_lat() {
        let route = vec![Position::new(10.0, 20.0, 0.0), Position::new(11.0, 21.0, 0.0)];
        let segments = build_segments(&route, &ColoringConfig::default(), &StyleConfig::default());
        assert_eq!(segments[0].line.start, Coord { x: 20.0, y: 10.0 });
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let speeds: Vec<f64> = (0..12_000).map(|i| (i % 97) as f64).collect();
        let route = sample_route(&speeds);
        let config = ColoringConfig::default();
        let style = StyleConfig::default();
        assert_eq!(
            build_segments_parallel(&route, &config, &style),
            build_segments(&route, &config, &style)
        );
    }
}
