//! Route rendering scenario tests.
//!
//! Exercises the public API end to end: positions and device attributes in,
//! segments, GeoJSON on a headless map surface and the legend out.
//!
//! Run with: `cargo test --test route_rendering`

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use route_colors::colormap::COLORMAP_END;
use route_colors::layer::line_layer_id;
use route_colors::legend::LEGEND_STOPS;
use route_colors::{
    build_legend, build_segments, colormap, legend_for_route, normalize, resolve_color, scale,
    Attributes, ColoringConfig, DefaultLabels, MapSurface, MemorySurface, Position, RouteView,
    SegmentColor, SpeedUnit, StyleConfig, DIGITAL_INPUT_COLOR,
};
use serde_json::json;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Three positions heading north at 0, 10 and 20 knots.
fn trip() -> Vec<Position> {
    vec![
        Position::new(52.5200, 13.4050, 0.0).with_device(1),
        Position::new(52.5210, 13.4050, 10.0).with_device(1),
        Position::new(52.5220, 13.4050, 20.0).with_device(1),
    ]
}

fn attrs(value: serde_json::Value) -> Attributes {
    value.as_object().cloned().unwrap_or_default()
}

// ============================================================================
// Scenario: plain speed coloring
// ============================================================================

#[test]
fn speed_gradient_scenario() {
    init();
    let positions = trip();
    let config = ColoringConfig::default();
    let range = normalize(&positions);

    let segments = build_segments(&positions, &config, &StyleConfig::default());
    assert_eq!(segments.len(), 2);

    // End speeds 10 and 20 on range [0, 20]
    assert_eq!(scale(10.0, &range), 0.5);
    assert_eq!(scale(20.0, &range), 1.0);
    assert_eq!(segments[0].color, SegmentColor::Speed(colormap(0.5)));
    assert_eq!(segments[1].color, SegmentColor::Speed(COLORMAP_END));

    let legend = legend_for_route(&positions, &config, SpeedUnit::Knots, &DefaultLabels).unwrap();
    assert_eq!(legend.min_label, "0");
    assert_eq!(legend.max_label, "20");

    let legend_kmh =
        legend_for_route(&positions, &config, SpeedUnit::Kmh, &DefaultLabels).unwrap();
    assert_eq!(legend_kmh.range_label(), "0 - 37 km/h");
}

// ============================================================================
// Scenario: fixed report color
// ============================================================================

#[test]
fn report_color_scenario() {
    let positions = trip();
    let config = ColoringConfig {
        report_color: Some("#ff0000".to_string()),
        ..ColoringConfig::default()
    };

    let segments = build_segments(&positions, &config, &StyleConfig::default());
    assert_eq!(segments.len(), 2);
    for segment in &segments {
        assert_eq!(segment.color.to_css(), "#ff0000");
    }

    // The fixed color does not suppress the legend
    let legend = build_legend(&config, &normalize(&positions), SpeedUnit::Knots, &DefaultLabels);
    assert!(legend.is_some());
}

// ============================================================================
// Scenario: digital input beats report color
// ============================================================================

#[test]
fn digital_input_scenario() {
    let mut positions = trip();
    positions[1] = positions[1].clone().with_attribute("in1", true);

    let config = ColoringConfig {
        report_color: Some("#ff0000".to_string()),
        color_by_digital_input_enabled: true,
        color_by_digital_input_name: Some("in1".to_string()),
    };

    let segments = build_segments(&positions, &config, &StyleConfig::default());
    assert_eq!(segments[0].color, SegmentColor::DigitalInput);
    assert_eq!(segments[0].color.to_css(), DIGITAL_INPUT_COLOR.to_css());
    assert_eq!(segments[1].color, SegmentColor::Fixed("#ff0000".to_string()));

    let legend = legend_for_route(&positions, &config, SpeedUnit::Knots, &DefaultLabels).unwrap();
    let swatch = legend.digital_input.unwrap();
    assert_eq!(swatch.color, DIGITAL_INPUT_COLOR);
    assert_eq!(swatch.label, "Input 1 active");
}

// ============================================================================
// Scenario: degenerate routes
// ============================================================================

#[test]
fn single_position_scenario() {
    let positions = vec![Position::new(52.52, 13.405, 8.0)];
    let config = ColoringConfig::default();

    assert!(build_segments(&positions, &config, &StyleConfig::default()).is_empty());
    assert!(legend_for_route(&positions, &config, SpeedUnit::Knots, &DefaultLabels).is_none());
}

#[test]
fn empty_route_scenario() {
    let config = ColoringConfig::default();
    assert!(build_segments(&[], &config, &StyleConfig::default()).is_empty());
    assert!(legend_for_route(&[], &config, SpeedUnit::Knots, &DefaultLabels).is_none());
    assert!(normalize(&[]).is_empty());
}

#[test]
fn constant_speed_route_uses_fallback_color() {
    let positions: Vec<Position> = (0..5)
        .map(|i| Position::new(52.52 + i as f64 * 0.001, 13.405, 15.0))
        .collect();
    let segments = build_segments(&positions, &ColoringConfig::default(), &StyleConfig::default());
    assert_eq!(segments.len(), 4);
    assert!(segments
        .iter()
        .all(|s| s.color == SegmentColor::Speed(colormap(0.0))));
}

// ============================================================================
// Properties over many routes
// ============================================================================

#[test]
fn resolver_priority_holds_for_every_segment() {
    let speeds = [3.0, 17.5, 0.0, 42.0, 42.0, 8.25, 30.0];
    let positions: Vec<Position> = speeds
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            Position::new(52.52 + i as f64 * 0.001, 13.405, s).with_attribute("in2", i % 3 == 0)
        })
        .collect();
    let range = normalize(&positions);
    assert!(range.min <= range.max);

    let digital = ColoringConfig {
        report_color: Some("navy".to_string()),
        color_by_digital_input_enabled: true,
        color_by_digital_input_name: Some("in2".to_string()),
    };
    let fixed = ColoringConfig {
        color_by_digital_input_enabled: false,
        ..digital.clone()
    };
    let plain = ColoringConfig::default();

    for end in &positions[1..] {
        let active = end.attributes.get("in2") == Some(&json!(true));
        let expected = if active {
            SegmentColor::DigitalInput
        } else {
            SegmentColor::Fixed("navy".to_string())
        };
        assert_eq!(resolve_color(end, &digital, &range), expected);
        assert_eq!(
            resolve_color(end, &fixed, &range),
            SegmentColor::Fixed("navy".to_string())
        );
        assert_eq!(
            resolve_color(end, &plain, &range),
            SegmentColor::Speed(colormap(scale(end.speed, &range)))
        );
    }
}

#[test]
fn legend_gradient_agrees_with_colormap() {
    let legend = build_legend(
        &ColoringConfig::default(),
        &normalize(&trip()),
        SpeedUnit::Mph,
        &DefaultLabels,
    )
    .unwrap();
    assert_eq!(legend.gradient.len(), LEGEND_STOPS);
    for stop in &legend.gradient {
        assert_eq!(stop.color, colormap(stop.offset));
    }
}

// ============================================================================
// Map binding through the route view
// ============================================================================

#[test]
fn route_view_full_lifecycle() {
    init();
    let map = Rc::new(RefCell::new(MemorySurface::new()));
    let mut view = RouteView::new(map.clone());

    let mut devices = HashMap::new();
    devices.insert(
        1,
        attrs(json!({
            "web.colorByDigitalInput": true,
            "web.colorByDigitalInputName": "in1",
        })),
    );

    let mut positions = trip();
    positions[2] = positions[2].clone().with_attribute("in1", true);

    view.select_route_for_devices("trip-42", positions, &devices)
        .unwrap();

    {
        let map = map.borrow();
        assert!(map.has_layer(&line_layer_id("trip-42")));
        let data = map.source("trip-42").unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.features[1].properties.color, DIGITAL_INPUT_COLOR.to_css());
        assert_eq!(data.features[0].geometry.coordinates[0], [13.4050, 52.5200]);
    }

    let legend = view.legend().unwrap();
    assert!(legend.digital_input.is_some());

    // Preferences change: every feature picks up the new style
    let style = StyleConfig::from_preferences(&attrs(json!({
        "mapLineWidth": 5,
        "mapLineOpacity": 0.5,
        "speedUnit": "kmh",
    })));
    view.set_style(style).unwrap();
    {
        let map = map.borrow();
        let data = map.source("trip-42").unwrap();
        assert!(data
            .features
            .iter()
            .all(|f| f.properties.width == 5.0 && f.properties.opacity == 0.5));
    }
    assert_eq!(view.legend().unwrap().unit_label, "km/h");

    // Positions shrink to one point: no segments, no legend
    view.set_positions(trip()[..1].to_vec()).unwrap();
    assert!(map.borrow().source("trip-42").unwrap().is_empty());
    assert!(view.legend().is_none());

    // The map loses the layer behind our back; deselect must still succeed
    map.borrow_mut().remove_layer("trip-42-line").unwrap();
    view.deselect();
    assert_eq!(map.borrow().source_count(), 0);

    // Reuse of the same id after teardown
    view.select_route("trip-42", trip(), ColoringConfig::default())
        .unwrap();
    assert_eq!(map.borrow().source("trip-42").unwrap().len(), 2);
}

#[test]
fn geojson_output_is_map_ready() {
    let segments = build_segments(&trip(), &ColoringConfig::default(), &StyleConfig::default());
    let json = route_colors::FeatureCollection::from_segments(&segments)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["type"], "FeatureCollection");
    assert_eq!(value["features"].as_array().unwrap().len(), 2);
    assert_eq!(value["features"][0]["geometry"]["type"], "LineString");
    assert_eq!(value["features"][1]["properties"]["color"], COLORMAP_END.to_css());
    assert_eq!(value["features"][1]["properties"]["width"], 2.0);
}
