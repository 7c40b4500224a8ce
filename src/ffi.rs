//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that expose route coloring to
//! Kotlin and Swift. Payloads cross the boundary as JSON strings in the same
//! shapes the server and web client use (positions, device attributes,
//! GeoJSON), so the native side can hand them straight to its map SDK.

use std::collections::HashMap;

use log::{info, warn};

use crate::view::with_route_view;
use crate::{
    build_segments, init_logging, Attributes, ColoringConfig, FeatureCollection, Position,
    StyleConfig,
};

fn parse<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("[RouteColorsRust] Invalid {} JSON: {}", what, e);
            None
        }
    }
}

// ============================================================================
// Stateless
// ============================================================================

/// Build the GeoJSON feature collection for a route in one call.
/// Returns an empty collection if any payload fails to parse.
#[uniffi::export]
pub fn route_colors_build_features_json(
    positions_json: String,
    coloring_json: String,
    style_json: String,
) -> String {
    init_logging();
    let positions: Vec<Position> = parse("positions", &positions_json).unwrap_or_default();
    let coloring: ColoringConfig = parse("coloring", &coloring_json).unwrap_or_default();
    let style: StyleConfig = parse("style", &style_json).unwrap_or_default();

    let segments = build_segments(&positions, &coloring, &style);
    FeatureCollection::from_segments(&segments)
        .to_json()
        .unwrap_or_else(|_| r#"{"type":"FeatureCollection","features":[]}"#.to_string())
}

// ============================================================================
// Route View
// ============================================================================

/// Select a route for display.
///
/// `device_attributes_json` maps device id to its attributes:
/// `{"12": {"web.reportColor": "#ff0000", ...}, ...}`.
/// Returns false if the payload is invalid or the route could not be registered.
#[uniffi::export]
pub fn route_view_select(
    route_id: String,
    positions_json: String,
    device_attributes_json: String,
) -> bool {
    init_logging();
    let Some(positions) = parse::<Vec<Position>>("positions", &positions_json) else {
        return false;
    };
    let devices: HashMap<i64, Attributes> =
        parse("device attributes", &device_attributes_json).unwrap_or_default();

    info!(
        "[RouteColorsRust] Selecting route {} ({} positions)",
        route_id,
        positions.len()
    );

    with_route_view(|view| match view.select_route_for_devices(&route_id, positions, &devices) {
        Ok(()) => true,
        Err(e) => {
            warn!("[RouteColorsRust] Failed to select route {}: {}", route_id, e);
            false
        }
    })
}

/// Replace the style (`{"lineWidth": 3, "lineOpacity": 0.8, "speedUnit": "kmh"}`).
#[uniffi::export]
pub fn route_view_set_style(style_json: String) -> bool {
    let Some(style) = parse::<StyleConfig>("style", &style_json) else {
        return false;
    };
    with_route_view(|view| view.set_style(style).is_ok())
}

/// Replace the style from raw user preferences (`mapLineWidth`, ...).
#[uniffi::export]
pub fn route_view_set_preferences(preferences_json: String) -> bool {
    let Some(preferences) = parse::<Attributes>("preferences", &preferences_json) else {
        return false;
    };
    let style = StyleConfig::from_preferences(&preferences);
    with_route_view(|view| view.set_style(style).is_ok())
}

/// Clear the selected route.
#[uniffi::export]
pub fn route_view_deselect() {
    with_route_view(|view| view.deselect());
    info!("[RouteColorsRust] Route deselected");
}

/// Current route source data as GeoJSON (what the map layer holds).
#[uniffi::export]
pub fn route_view_features_json() -> String {
    with_route_view(|view| {
        let data = view
            .route_id()
            .and_then(|id| {
                let surface = view
                    .surface()
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                surface.source(id).cloned()
            })
            .unwrap_or_default();
        data.to_json()
            .unwrap_or_else(|_| r#"{"type":"FeatureCollection","features":[]}"#.to_string())
    })
}

/// Current legend as JSON, or `null` when the route has no legend.
#[uniffi::export]
pub fn route_view_legend_json() -> String {
    with_route_view(|view| {
        serde_json::to_string(&view.legend()).unwrap_or_else(|_| "null".to_string())
    })
}

/// Bounds of the selected route as `[min_lat, min_lng, max_lat, max_lng]`,
/// empty when nothing is selected.
#[uniffi::export]
pub fn route_view_bounds() -> Vec<f64> {
    with_route_view(|view| {
        view.route_bounds()
            .map(|b| vec![b.min_lat, b.min_lng, b.max_lat, b.max_lng])
            .unwrap_or_default()
    })
}
