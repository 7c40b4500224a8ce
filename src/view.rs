//! # Route View
//!
//! Owner of the currently selected route. It keeps only the latest inputs
//! (positions, coloring, style) and the latest derived output (speed range,
//! segments, legend), and replaces the derived output wholesale whenever an
//! input changes.
//!
//! ## Lifecycle
//!
//! - [`RouteView::select_route`] releases the previous route's layer before
//!   registering the new one, so the same route id can be reused.
//! - Each setter recomputes the full segment list and pushes it to the map.
//! - [`RouteView::deselect`] (or dropping the view) releases the layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, info};
use once_cell::sync::Lazy;

use crate::config::{ColoringConfig, StyleConfig};
use crate::error::Result;
use crate::geojson::FeatureCollection;
use crate::layer::{MapSurface, MemorySurface, RouteLayer};
use crate::legend::{build_legend, Legend};
use crate::segments::{route_bounds, RouteBounds, Segment};
use crate::speed::{normalize, SpeedRange};
use crate::units::{DefaultLabels, Translator};
use crate::{Attributes, Position};

#[cfg(feature = "parallel")]
use crate::segments::build_segments_parallel;

#[cfg(not(feature = "parallel"))]
use crate::segments::build_segments_in_range;

/// Boxed label source, `Send` so a view can live behind a global mutex.
pub type BoxedTranslator = Box<dyn Translator + Send + Sync>;

pub struct RouteView<M: MapSurface + Clone> {
    surface: M,
    layer: Option<RouteLayer<M>>,
    translator: BoxedTranslator,

    // Inputs
    route_id: Option<String>,
    positions: Vec<Position>,
    coloring: ColoringConfig,
    style: StyleConfig,

    // Derived
    range: SpeedRange,
    segments: Vec<Segment>,
    legend: Option<Legend>,
}

impl<M: MapSurface + Clone> RouteView<M> {
    /// Create a view drawing onto `surface` with default style and labels.
    pub fn new(surface: M) -> Self {
        Self {
            surface,
            layer: None,
            translator: Box::new(DefaultLabels),
            route_id: None,
            positions: Vec::new(),
            coloring: ColoringConfig::default(),
            style: StyleConfig::default(),
            range: SpeedRange::empty(),
            segments: Vec::new(),
            legend: None,
        }
    }

    /// Create a view with custom style and labels.
    pub fn with_config(surface: M, style: StyleConfig, translator: BoxedTranslator) -> Self {
        Self {
            style,
            translator,
            ..Self::new(surface)
        }
    }

    // ========================================================================
    // Route Selection
    // ========================================================================

    /// Show a route. Any previously shown route is torn down first.
    pub fn select_route(
        &mut self,
        route_id: &str,
        positions: Vec<Position>,
        coloring: ColoringConfig,
    ) -> Result<()> {
        self.deselect();

        let layer = RouteLayer::acquire(self.surface.clone(), route_id)?;
        info!(
            "[RouteView] Selected route {} ({} positions)",
            route_id,
            positions.len()
        );

        self.layer = Some(layer);
        self.route_id = Some(route_id.to_string());
        self.positions = positions;
        self.coloring = coloring;
        self.recompute()
    }

    /// Show a route, reading coloring from the attributes of the device that
    /// owns its representative position.
    pub fn select_route_for_devices(
        &mut self,
        route_id: &str,
        positions: Vec<Position>,
        devices: &HashMap<i64, Attributes>,
    ) -> Result<()> {
        let coloring = ColoringConfig::for_route(&positions, devices);
        self.select_route(route_id, positions, coloring)
    }

    /// Stop showing the current route and drop all derived state.
    pub fn deselect(&mut self) {
        if let Some(mut layer) = self.layer.take() {
            layer.release();
            info!("[RouteView] Deselected route {}", layer.source_id());
        }
        self.route_id = None;
        self.positions.clear();
        self.range = SpeedRange::empty();
        self.segments.clear();
        self.legend = None;
    }

    // ========================================================================
    // Input Changes
    // ========================================================================

    pub fn set_positions(&mut self, positions: Vec<Position>) -> Result<()> {
        self.positions = positions;
        self.recompute()
    }

    pub fn set_coloring(&mut self, coloring: ColoringConfig) -> Result<()> {
        self.coloring = coloring;
        self.recompute()
    }

    pub fn set_style(&mut self, style: StyleConfig) -> Result<()> {
        self.style = style;
        self.recompute()
    }

    /// Rebuild range, segments and legend from the current inputs and push
    /// the segments to the map.
    fn recompute(&mut self) -> Result<()> {
        self.range = normalize(&self.positions);

        #[cfg(feature = "parallel")]
        let segments = build_segments_parallel(&self.positions, &self.coloring, &self.style);

        #[cfg(not(feature = "parallel"))]
        let segments =
            build_segments_in_range(&self.positions, &self.coloring, &self.style, &self.range);

        self.segments = segments;
        self.legend = if self.segments.is_empty() {
            None
        } else {
            build_legend(
                &self.coloring,
                &self.range,
                self.style.speed_unit,
                self.translator.as_ref(),
            )
        };

        debug!(
            "[RouteView] Recomputed {} segments (legend: {})",
            self.segments.len(),
            self.legend.is_some()
        );

        match self.layer.as_mut() {
            Some(layer) => layer.update(FeatureCollection::from_segments(&self.segments)),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn route_id(&self) -> Option<&str> {
        self.route_id.as_deref()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn coloring(&self) -> &ColoringConfig {
        &self.coloring
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn speed_range(&self) -> SpeedRange {
        self.range
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    /// Current segments as a feature collection.
    pub fn features(&self) -> FeatureCollection {
        FeatureCollection::from_segments(&self.segments)
    }

    /// Bounds of the current route for camera fitting.
    pub fn route_bounds(&self) -> Option<RouteBounds> {
        route_bounds(&self.positions)
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }
}

// ============================================================================
// Global Singleton
// ============================================================================

/// Surface handle shared between the global view and its readers.
pub type SharedSurface = Arc<Mutex<MemorySurface>>;

/// Global route view drawing onto a headless surface.
///
/// This singleton allows FFI calls to drive one selected route without
/// passing state back and forth across the FFI boundary.
pub static ROUTE_VIEW: Lazy<Mutex<RouteView<SharedSurface>>> =
    Lazy::new(|| Mutex::new(RouteView::new(Arc::new(Mutex::new(MemorySurface::new())))));

/// Get a lock on the global route view.
pub fn with_route_view<F, R>(f: F) -> R
where
    F: FnOnce(&mut RouteView<SharedSurface>) -> R,
{
    let mut view = ROUTE_VIEW
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut view)
}
