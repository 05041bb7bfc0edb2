// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mapping provider abstraction.
//!
//! Map rendering and shape drawing belong to an external toolkit. The rest of
//! the crate only talks to it through [`MapProvider`], and learns whether the
//! optional drawing plugin loaded through [`DrawingCapability`].

pub mod scene;

pub use scene::SceneMapProvider;

use crate::models::{Coordinate, Ring};
use serde::{Deserialize, Serialize};

/// Handle to one live map instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapInstanceId(pub u64);

/// Handle to a polygon or marker drawn on a map instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

/// Initial viewport of a map surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_lat: 0.0,
            center_lng: 0.0,
            zoom: 12,
        }
    }
}

/// How a polygon overlay is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStyle {
    /// A zone already stored by the backend
    Persisted,
    /// A freshly drawn shape waiting for a name
    Pending,
}

/// Something drawn on a map instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Overlay {
    Polygon {
        id: OverlayId,
        ring: Ring,
        style: OverlayStyle,
    },
    Marker {
        id: OverlayId,
        at: Coordinate,
        label: Option<String>,
    },
}

impl Overlay {
    pub fn id(&self) -> OverlayId {
        match self {
            Overlay::Polygon { id, .. } | Overlay::Marker { id, .. } => *id,
        }
    }
}

/// Whether the optional drawing plugin is usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum DrawingCapability {
    Supported,
    Unavailable(String),
}

impl DrawingCapability {
    pub fn is_supported(&self) -> bool {
        matches!(self, DrawingCapability::Supported)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Map instance {0:?} is not live")]
    UnknownInstance(MapInstanceId),

    #[error("Map toolkit failure: {0}")]
    Toolkit(String),
}

impl From<MapError> for crate::error::AppError {
    fn from(err: MapError) -> Self {
        crate::error::AppError::Internal(anyhow::Error::new(err))
    }
}

/// Capability surface of the external mapping toolkit.
pub trait MapProvider: Send {
    /// Create a map instance bound to `surface`.
    fn init(&mut self, surface: &str, view: MapView) -> Result<MapInstanceId, MapError>;

    /// Tear down an instance and everything drawn on it.
    fn destroy(&mut self, instance: MapInstanceId);

    fn draw_polygon(
        &mut self,
        instance: MapInstanceId,
        ring: &Ring,
        style: OverlayStyle,
    ) -> Result<OverlayId, MapError>;

    fn add_marker(
        &mut self,
        instance: MapInstanceId,
        at: Coordinate,
        label: Option<&str>,
    ) -> Result<OverlayId, MapError>;

    /// Remove one overlay. Unknown ids are ignored.
    fn remove_overlay(&mut self, instance: MapInstanceId, overlay: OverlayId);

    /// Toggle the polygon drawing interaction.
    fn set_drawing_mode(&mut self, instance: MapInstanceId, active: bool)
        -> Result<(), MapError>;

    /// Overlays currently drawn on an instance.
    fn overlays(&self, instance: MapInstanceId) -> Vec<Overlay>;
}

/// A named map surface holding at most one live instance.
pub struct MapSurface {
    name: String,
    provider: Box<dyn MapProvider>,
    instance: Option<MapInstanceId>,
}

impl MapSurface {
    pub fn new(name: impl Into<String>, provider: Box<dyn MapProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
            instance: None,
        }
    }

    /// (Re)initialize the surface.
    ///
    /// Any existing instance is destroyed first so overlays and controls are
    /// never registered twice.
    pub fn init(&mut self, view: MapView) -> Result<MapInstanceId, MapError> {
        if let Some(old) = self.instance.take() {
            tracing::debug!(surface = %self.name, instance = old.0, "Tearing down map instance");
            self.provider.destroy(old);
        }
        let instance = self.provider.init(&self.name, view)?;
        tracing::debug!(surface = %self.name, instance = instance.0, "Map instance ready");
        self.instance = Some(instance);
        Ok(instance)
    }

    pub fn destroy(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.provider.destroy(instance);
        }
    }

    pub fn instance(&self) -> Option<MapInstanceId> {
        self.instance
    }

    pub fn is_ready(&self) -> bool {
        self.instance.is_some()
    }

    fn live(&self) -> Result<MapInstanceId, MapError> {
        self.instance
            .ok_or_else(|| MapError::Toolkit(format!("surface {} is not initialized", self.name)))
    }

    pub fn draw_polygon(&mut self, ring: &Ring, style: OverlayStyle) -> Result<OverlayId, MapError> {
        let instance = self.live()?;
        self.provider.draw_polygon(instance, ring, style)
    }

    pub fn add_marker(
        &mut self,
        at: Coordinate,
        label: Option<&str>,
    ) -> Result<OverlayId, MapError> {
        let instance = self.live()?;
        self.provider.add_marker(instance, at, label)
    }

    pub fn remove_overlay(&mut self, overlay: OverlayId) {
        if let Some(instance) = self.instance {
            self.provider.remove_overlay(instance, overlay);
        }
    }

    pub fn set_drawing_mode(&mut self, active: bool) -> Result<(), MapError> {
        let instance = self.live()?;
        self.provider.set_drawing_mode(instance, active)
    }

    pub fn overlays(&self) -> Vec<Overlay> {
        self.instance
            .map(|instance| self.provider.overlays(instance))
            .unwrap_or_default()
    }
}

impl Drop for MapSurface {
    fn drop(&mut self) {
        self.destroy();
    }
}
