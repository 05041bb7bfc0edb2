// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Headless mapping provider.
//!
//! Keeps the scene (instances, overlays, drawing mode) in memory. The gateway
//! serves this scene to the dashboard, which renders it with its own tile
//! layer. Clones share the same scene.

use super::{MapError, MapInstanceId, MapProvider, MapView, Overlay, OverlayId, OverlayStyle};
use crate::models::{Coordinate, Ring};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Default)]
pub struct SceneMapProvider {
    inner: Arc<Mutex<SceneInner>>,
}

#[derive(Default)]
struct SceneInner {
    next_id: u64,
    instances: BTreeMap<MapInstanceId, SceneInstance>,
}

struct SceneInstance {
    surface: String,
    view: MapView,
    overlays: Vec<Overlay>,
    drawing: bool,
}

impl SceneInner {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn instance_mut(&mut self, id: MapInstanceId) -> Result<&mut SceneInstance, MapError> {
        self.instances
            .get_mut(&id)
            .ok_or(MapError::UnknownInstance(id))
    }
}

impl SceneMapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SceneInner> {
        // A panic while holding the lock leaves the scene consistent enough to read.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of live instances across all surfaces.
    pub fn live_instances(&self) -> usize {
        self.lock().instances.len()
    }

    /// Number of live instances bound to `surface`.
    pub fn instances_on(&self, surface: &str) -> usize {
        self.lock()
            .instances
            .values()
            .filter(|i| i.surface == surface)
            .count()
    }

    pub fn is_drawing(&self, instance: MapInstanceId) -> bool {
        self.lock()
            .instances
            .get(&instance)
            .map(|i| i.drawing)
            .unwrap_or(false)
    }

    pub fn view(&self, instance: MapInstanceId) -> Option<MapView> {
        self.lock().instances.get(&instance).map(|i| i.view)
    }
}

impl MapProvider for SceneMapProvider {
    fn init(&mut self, surface: &str, view: MapView) -> Result<MapInstanceId, MapError> {
        let mut scene = self.lock();
        let id = MapInstanceId(scene.next());
        scene.instances.insert(
            id,
            SceneInstance {
                surface: surface.to_string(),
                view,
                overlays: Vec::new(),
                drawing: false,
            },
        );
        Ok(id)
    }

    fn destroy(&mut self, instance: MapInstanceId) {
        self.lock().instances.remove(&instance);
    }

    fn draw_polygon(
        &mut self,
        instance: MapInstanceId,
        ring: &Ring,
        style: OverlayStyle,
    ) -> Result<OverlayId, MapError> {
        let mut scene = self.lock();
        let id = OverlayId(scene.next());
        scene.instance_mut(instance)?.overlays.push(Overlay::Polygon {
            id,
            ring: ring.clone(),
            style,
        });
        Ok(id)
    }

    fn add_marker(
        &mut self,
        instance: MapInstanceId,
        at: Coordinate,
        label: Option<&str>,
    ) -> Result<OverlayId, MapError> {
        let mut scene = self.lock();
        let id = OverlayId(scene.next());
        scene.instance_mut(instance)?.overlays.push(Overlay::Marker {
            id,
            at,
            label: label.map(str::to_string),
        });
        Ok(id)
    }

    fn remove_overlay(&mut self, instance: MapInstanceId, overlay: OverlayId) {
        if let Ok(inst) = self.lock().instance_mut(instance) {
            inst.overlays.retain(|o| o.id() != overlay);
        }
    }

    fn set_drawing_mode(&mut self, instance: MapInstanceId, active: bool) -> Result<(), MapError> {
        self.lock().instance_mut(instance)?.drawing = active;
        Ok(())
    }

    fn overlays(&self, instance: MapInstanceId) -> Vec<Overlay> {
        self.lock()
            .instances
            .get(&instance)
            .map(|i| i.overlays.clone())
            .unwrap_or_default()
    }
}
