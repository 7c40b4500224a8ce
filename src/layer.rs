//! # Map Layer Binding
//!
//! Registers a route's GeoJSON source and line layer on a map surface, pushes
//! new feature collections into it, and tears both down again.
//!
//! [`RouteLayer`] is a scoped guard: it registers on [`RouteLayer::acquire`]
//! and unregisters on [`RouteLayer::release`] or when dropped. Release checks
//! for presence first, so it is safe to run after the map (or someone else)
//! already removed the layer or source.
//!
//! The surface handle `M` is usually shared with the owner of the map, e.g.
//! `Rc<RefCell<S>>` on a UI thread or `Arc<Mutex<S>>` behind an FFI boundary.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, RouteColorError};
use crate::geojson::FeatureCollection;

/// The parts of a map surface the route binding needs.
pub trait MapSurface {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<()>;
    fn add_layer(&mut self, layer: LayerSpec) -> Result<()>;
    fn has_source(&self, id: &str) -> bool;
    fn has_layer(&self, id: &str) -> bool;
    fn remove_layer(&mut self, id: &str) -> Result<()>;
    fn remove_source(&mut self, id: &str) -> Result<()>;
    /// Replace a source's data wholesale.
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()>;
}

impl<T: MapSurface + ?Sized> MapSurface for &mut T {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        (**self).add_source(id, data)
    }
    fn add_layer(&mut self, layer: LayerSpec) -> Result<()> {
        (**self).add_layer(layer)
    }
    fn has_source(&self, id: &str) -> bool {
        (**self).has_source(id)
    }
    fn has_layer(&self, id: &str) -> bool {
        (**self).has_layer(id)
    }
    fn remove_layer(&mut self, id: &str) -> Result<()> {
        (**self).remove_layer(id)
    }
    fn remove_source(&mut self, id: &str) -> Result<()> {
        (**self).remove_source(id)
    }
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        (**self).set_source_data(id, data)
    }
}

impl<T: MapSurface> MapSurface for Rc<RefCell<T>> {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        self.borrow_mut().add_source(id, data)
    }
    fn add_layer(&mut self, layer: LayerSpec) -> Result<()> {
        self.borrow_mut().add_layer(layer)
    }
    fn has_source(&self, id: &str) -> bool {
        self.borrow().has_source(id)
    }
    fn has_layer(&self, id: &str) -> bool {
        self.borrow().has_layer(id)
    }
    fn remove_layer(&mut self, id: &str) -> Result<()> {
        self.borrow_mut().remove_layer(id)
    }
    fn remove_source(&mut self, id: &str) -> Result<()> {
        self.borrow_mut().remove_source(id)
    }
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        self.borrow_mut().set_source_data(id, data)
    }
}

// A poisoned surface is still structurally valid; keep using it.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T: MapSurface> MapSurface for Arc<Mutex<T>> {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        lock(self).add_source(id, data)
    }
    fn add_layer(&mut self, layer: LayerSpec) -> Result<()> {
        lock(self).add_layer(layer)
    }
    fn has_source(&self, id: &str) -> bool {
        lock(self).has_source(id)
    }
    fn has_layer(&self, id: &str) -> bool {
        lock(self).has_layer(id)
    }
    fn remove_layer(&mut self, id: &str) -> Result<()> {
        lock(self).remove_layer(id)
    }
    fn remove_source(&mut self, id: &str) -> Result<()> {
        lock(self).remove_source(id)
    }
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        lock(self).set_source_data(id, data)
    }
}

// ============================================================================
// Layer Specification
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineLayout {
    #[serde(rename = "line-join")]
    pub line_join: String,
    #[serde(rename = "line-cap")]
    pub line_cap: String,
}

/// Paint rules; each value is a style expression such as `["get", "color"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePaint {
    #[serde(rename = "line-color")]
    pub line_color: Value,
    #[serde(rename = "line-width")]
    pub line_width: Value,
    #[serde(rename = "line-opacity")]
    pub line_opacity: Value,
}

/// A line layer in map style JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub layout: LineLayout,
    pub paint: LinePaint,
}

impl LayerSpec {
    /// Round-joined line layer that reads `color`, `width` and `opacity`
    /// from each feature of `source_id`.
    pub fn route_line(source_id: &str) -> Self {
        Self {
            id: line_layer_id(source_id),
            source: source_id.to_string(),
            kind: "line".to_string(),
            layout: LineLayout {
                line_join: "round".to_string(),
                line_cap: "round".to_string(),
            },
            paint: LinePaint {
                line_color: json!(["get", "color"]),
                line_width: json!(["get", "width"]),
                line_opacity: json!(["get", "opacity"]),
            },
        }
    }
}

/// Layer id for a route source: `"{source_id}-line"`.
pub fn line_layer_id(source_id: &str) -> String {
    format!("{}-line", source_id)
}

// ============================================================================
// Scoped Route Layer
// ============================================================================

/// A route's source+layer pair registered on a map surface.
///
/// Dropping the guard releases the pair.
pub struct RouteLayer<M: MapSurface> {
    surface: M,
    source_id: String,
    layer_id: String,
    attached: bool,
}

impl<M: MapSurface> RouteLayer<M> {
    /// Register an empty source and its line layer under `route_id`.
    ///
    /// If the layer cannot be added, the source registered a moment earlier
    /// is removed again before the error is returned.
    pub fn acquire(mut surface: M, route_id: &str) -> Result<Self> {
        let layer = LayerSpec::route_line(route_id);
        let layer_id = layer.id.clone();

        surface.add_source(route_id, FeatureCollection::empty())?;
        if let Err(e) = surface.add_layer(layer) {
            warn!("[RouteLayer] Failed to add layer {}: {}", layer_id, e);
            if surface.has_source(route_id) {
                let _ = surface.remove_source(route_id);
            }
            return Err(e);
        }

        debug!("[RouteLayer] Registered {} / {}", route_id, layer_id);
        Ok(Self {
            surface,
            source_id: route_id.to_string(),
            layer_id,
            attached: true,
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    /// Replace the source's features. A missing source (already torn down by
    /// the map) is skipped rather than treated as an error.
    pub fn update(&mut self, data: FeatureCollection) -> Result<()> {
        if !self.attached || !self.surface.has_source(&self.source_id) {
            debug!(
                "[RouteLayer] Source {} absent, skipping update of {} features",
                self.source_id,
                data.len()
            );
            return Ok(());
        }
        self.surface.set_source_data(&self.source_id, data)
    }

    /// Remove the layer, then the source. Safe to call any number of times.
    pub fn release(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;

        if self.surface.has_layer(&self.layer_id) {
            if let Err(e) = self.surface.remove_layer(&self.layer_id) {
                warn!("[RouteLayer] Failed to remove layer {}: {}", self.layer_id, e);
            }
        } else {
            debug!("[RouteLayer] Layer {} already removed", self.layer_id);
        }

        if self.surface.has_source(&self.source_id) {
            if let Err(e) = self.surface.remove_source(&self.source_id) {
                warn!("[RouteLayer] Failed to remove source {}: {}", self.source_id, e);
            }
        } else {
            debug!("[RouteLayer] Source {} already removed", self.source_id);
        }

        debug!("[RouteLayer] Released {}", self.source_id);
    }
}

impl<M: MapSurface> Drop for RouteLayer<M> {
    fn drop(&mut self) {
        self.release();
    }
}

// ============================================================================
// In-Memory Surface
// ============================================================================

/// Headless map surface that keeps sources and layers in memory.
///
/// Behaves like a real map for id handling: duplicate ids, layers on unknown
/// sources and removal of unknown ids are errors. Layers keep their
/// insertion (z) order.
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    sources: BTreeMap<String, FeatureCollection>,
    layers: Vec<LayerSpec>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self, id: &str) -> Option<&FeatureCollection> {
        self.sources.get(id)
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Layer ids, bottom to top.
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl MapSurface for MemorySurface {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        if self.sources.contains_key(id) {
            return Err(RouteColorError::DuplicateSource { id: id.to_string() });
        }
        self.sources.insert(id.to_string(), data);
        Ok(())
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<()> {
        if self.has_layer(&layer.id) {
            return Err(RouteColorError::DuplicateLayer { id: layer.id });
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(RouteColorError::MissingSource {
                layer_id: layer.id,
                source_id: layer.source,
            });
        }
        self.layers.push(layer);
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn remove_layer(&mut self, id: &str) -> Result<()> {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        if self.layers.len() == before {
            return Err(RouteColorError::LayerNotFound { id: id.to_string() });
        }
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RouteColorError::SourceNotFound { id: id.to_string() })
    }

    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<()> {
        match self.sources.get_mut(id) {
            Some(existing) => {
                *existing = data;
                Ok(())
            }
            None => Err(RouteColorError::SourceNotFound { id: id.to_string() }),
        }
    }
}
