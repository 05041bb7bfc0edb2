// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geometry capture: outlining a zone boundary on the map.
//!
//! State flow:
//! `Idle → Drawing → Pending → Saving → Idle`, with `Saving → Pending` when
//! the backend rejects the save and `discard_pending` returning to `Idle`
//! from anywhere.

use crate::error::{AppError, Result};
use crate::map::{DrawingCapability, MapSurface, MapView, Overlay, OverlayId, OverlayStyle};
use crate::models::{Coordinate, Ring, Zone};
use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Marker label for the pending shape's preview point.
const PREVIEW_LABEL: &str = "New zone";

/// Outcome of asking to start drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaptureNotice {
    /// Drawing mode is active.
    Drawing,
    /// Nothing happened; show `reason` to the operator.
    DrawingDisabled { reason: String },
}

/// Whether the "draw" button is usable, and why not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DrawAction {
    pub enabled: bool,
    pub message: Option<String>,
}

/// A completed shape waiting for a name.
#[derive(Debug, Clone, Serialize)]
pub struct PendingShape {
    pub ring: Ring,
    /// Bounding-box center, shown as a marker
    pub preview: Coordinate,
    pub completed_at: DateTime<Utc>,
    #[serde(skip)]
    polygon: OverlayId,
    #[serde(skip)]
    marker: OverlayId,
}

#[derive(Debug)]
enum CaptureState {
    Idle,
    Drawing,
    Pending(PendingShape),
    Saving(PendingShape),
}

/// Serializable snapshot of the capture state.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureStatus {
    pub state: &'static str,
    pub pending: Option<PendingShape>,
    pub draw_action: DrawAction,
}

/// Drawing surface for zone boundaries.
pub struct GeometryCapture {
    surface: MapSurface,
    capability: DrawingCapability,
    state: CaptureState,
    /// Persisted zones currently drawn, with their overlays
    shown: Vec<(Zone, [OverlayId; 2])>,
}

impl GeometryCapture {
    pub fn new(surface: MapSurface, capability: DrawingCapability) -> Self {
        if let DrawingCapability::Unavailable(reason) = &capability {
            tracing::warn!(reason = %reason, "Drawing toolkit unavailable, capture disabled");
        }
        Self {
            surface,
            capability,
            state: CaptureState::Idle,
            shown: Vec::new(),
        }
    }

    /// (Re)initialize the map and redraw everything that was on it.
    pub fn init_map(&mut self, view: MapView) -> Result<()> {
        self.surface.init(view)?;

        let zones: Vec<Zone> = self.shown.drain(..).map(|(zone, _)| zone).collect();
        self.show_zones(&zones)?;

        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Pending(shape) => {
                let shape = self.draw_pending(shape.ring, shape.completed_at)?;
                self.state = CaptureState::Pending(shape);
            }
            CaptureState::Saving(shape) => {
                let shape = self.draw_pending(shape.ring, shape.completed_at)?;
                self.state = CaptureState::Saving(shape);
            }
            // A fresh instance starts outside drawing mode.
            CaptureState::Drawing | CaptureState::Idle => {}
        }
        Ok(())
    }

    /// Draw persisted zones, replacing whatever zones were drawn before.
    ///
    /// Works without the drawing plugin.
    pub fn show_zones(&mut self, zones: &[Zone]) -> Result<()> {
        for (_, overlays) in self.shown.drain(..) {
            for overlay in overlays {
                self.surface.remove_overlay(overlay);
            }
        }
        for zone in zones {
            self.show_zone(zone)?;
        }
        Ok(())
    }

    fn show_zone(&mut self, zone: &Zone) -> Result<()> {
        let polygon = self
            .surface
            .draw_polygon(&zone.geometry, OverlayStyle::Persisted)?;
        let marker = match self.surface.add_marker(zone.centroid, Some(&zone.name)) {
            Ok(marker) => marker,
            Err(e) => {
                self.surface.remove_overlay(polygon);
                return Err(e.into());
            }
        };
        self.shown.push((zone.clone(), [polygon, marker]));
        Ok(())
    }

    /// Forget a persisted zone's overlays.
    pub fn hide_zone(&mut self, id: &str) {
        let (hidden, kept): (Vec<_>, Vec<_>) =
            self.shown.drain(..).partition(|(zone, _)| zone.id == id);
        self.shown = kept;
        for overlay in hidden.into_iter().flat_map(|(_, overlays)| overlays) {
            self.surface.remove_overlay(overlay);
        }
    }

    pub fn draw_action(&self) -> DrawAction {
        match (&self.capability, self.surface.is_ready()) {
            (DrawingCapability::Unavailable(reason), _) => DrawAction {
                enabled: false,
                message: Some(format!("Drawing is unavailable: {}", reason)),
            },
            (DrawingCapability::Supported, false) => DrawAction {
                enabled: false,
                message: Some("The map is still loading".to_string()),
            },
            (DrawingCapability::Supported, true) => DrawAction {
                enabled: true,
                message: None,
            },
        }
    }

    /// Activate polygon drawing.
    ///
    /// Without the drawing toolkit this is a no-op returning a notice for the
    /// operator.
    pub fn begin_capture(&mut self) -> Result<CaptureNotice> {
        let action = self.draw_action();
        if !action.enabled {
            let reason = action.message.unwrap_or_default();
            tracing::warn!(reason = %reason, "Capture requested while drawing is disabled");
            return Ok(CaptureNotice::DrawingDisabled { reason });
        }

        match self.state {
            CaptureState::Drawing => Ok(CaptureNotice::Drawing),
            CaptureState::Idle => {
                self.surface.set_drawing_mode(true)?;
                self.state = CaptureState::Drawing;
                tracing::debug!("Drawing mode active");
                Ok(CaptureNotice::Drawing)
            }
            CaptureState::Pending(_) => Err(AppError::Validation(
                "save or discard the pending shape first".to_string(),
            )),
            CaptureState::Saving(_) => Err(AppError::Busy),
        }
    }

    /// Accept the shape the operator just finished outlining.
    pub fn on_shape_completed(&mut self, vertices: Vec<Coordinate>) -> Result<PendingShape> {
        match self.state {
            CaptureState::Drawing => {}
            CaptureState::Saving(_) => return Err(AppError::Busy),
            _ => {
                return Err(AppError::Validation(
                    "drawing mode is not active".to_string(),
                ))
            }
        }

        let ring = Ring::new(vertices)?;
        let shape = self.draw_pending(ring, Utc::now())?;
        self.surface.set_drawing_mode(false)?;

        tracing::info!(
            vertices = shape.ring.vertices().len(),
            preview_lat = shape.preview.lat,
            preview_lng = shape.preview.lng,
            "Shape captured"
        );
        self.state = CaptureState::Pending(shape.clone());
        Ok(shape)
    }

    fn draw_pending(&mut self, ring: Ring, completed_at: DateTime<Utc>) -> Result<PendingShape> {
        let preview = ring.bounding_center();
        let polygon = self.surface.draw_polygon(&ring, OverlayStyle::Pending)?;
        let marker = match self.surface.add_marker(preview, Some(PREVIEW_LABEL)) {
            Ok(marker) => marker,
            Err(e) => {
                self.surface.remove_overlay(polygon);
                return Err(e.into());
            }
        };
        Ok(PendingShape {
            ring,
            preview,
            completed_at,
            polygon,
            marker,
        })
    }

    /// Drop the pending shape (or leave drawing mode). Always succeeds.
    pub fn discard_pending(&mut self) {
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Pending(shape) | CaptureState::Saving(shape) => {
                self.surface.remove_overlay(shape.polygon);
                self.surface.remove_overlay(shape.marker);
            }
            CaptureState::Drawing => {
                if let Err(e) = self.surface.set_drawing_mode(false) {
                    tracing::debug!(error = %e, "Could not leave drawing mode");
                }
            }
            CaptureState::Idle => {}
        }
    }

    /// Mark the pending shape as being saved and hand out its ring.
    pub fn begin_save(&mut self) -> Result<Ring> {
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Pending(shape) => {
                let ring = shape.ring.clone();
                self.state = CaptureState::Saving(shape);
                Ok(ring)
            }
            CaptureState::Saving(shape) => {
                self.state = CaptureState::Saving(shape);
                Err(AppError::Busy)
            }
            other => {
                self.state = other;
                Err(AppError::Validation("no pending shape to save".to_string()))
            }
        }
    }

    /// The save went through: the pending shape becomes a persisted zone.
    pub fn complete_save(&mut self, zone: &Zone) {
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Saving(shape) => {
                self.surface.remove_overlay(shape.polygon);
                self.surface.remove_overlay(shape.marker);
            }
            other => self.state = other,
        }
        if let Err(e) = self.show_zone(zone) {
            tracing::warn!(zone_id = %zone.id, error = %e, "Saved zone could not be drawn");
        }
    }

    /// The save failed: keep the shape on screen for another try.
    pub fn abort_save(&mut self) {
        self.state = match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Saving(shape) => CaptureState::Pending(shape),
            other => other,
        };
    }

    pub fn pending(&self) -> Option<&PendingShape> {
        match &self.state {
            CaptureState::Pending(shape) | CaptureState::Saving(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, CaptureState::Drawing)
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, CaptureState::Saving(_))
    }

    pub fn capability(&self) -> &DrawingCapability {
        &self.capability
    }

    pub fn overlays(&self) -> Vec<Overlay> {
        self.surface.overlays()
    }

    pub fn status(&self) -> CaptureStatus {
        let state = match self.state {
            CaptureState::Idle => "idle",
            CaptureState::Drawing => "drawing",
            CaptureState::Pending(_) => "pending",
            CaptureState::Saving(_) => "saving",
        };
        CaptureStatus {
            state,
            pending: self.pending().cloned(),
            draw_action: self.draw_action(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{MapError, MapInstanceId, MapProvider, SceneMapProvider};
    use crate::models::Status;

    fn square() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(0.0, 0.0),
        ]
    }

    fn capture(capability: DrawingCapability) -> (GeometryCapture, SceneMapProvider) {
        let provider = SceneMapProvider::new();
        let surface = MapSurface::new("zones", Box::new(provider.clone()));
        let mut capture = GeometryCapture::new(surface, capability);
        capture.init_map(MapView::default()).unwrap();
        (capture, provider)
    }

    #[test]
    fn test_shape_completion_exposes_preview() {
        let (mut capture, provider) = capture(DrawingCapability::Supported);
        assert_eq!(capture.begin_capture().unwrap(), CaptureNotice::Drawing);
        assert!(capture.is_drawing());

        let shape = capture.on_shape_completed(square()).unwrap();
        assert_eq!(shape.preview, Coordinate::new(0.5, 0.5));
        assert!(!capture.is_drawing());
        assert_eq!(capture.overlays().len(), 2);

        let instance = capture.surface.instance().unwrap();
        assert!(!provider.is_drawing(instance));
    }

    #[test]
    fn test_unavailable_toolkit_is_noop() {
        let (mut capture, _) =
            capture(DrawingCapability::Unavailable("plugin fetch failed".to_string()));
        let notice = capture.begin_capture().unwrap();
        assert!(matches!(notice, CaptureNotice::DrawingDisabled { ref reason } if reason.contains("plugin fetch failed")));
        assert!(!capture.is_drawing());
        assert!(!capture.draw_action().enabled);
    }

    #[test]
    fn test_degenerate_shape_keeps_drawing() {
        let (mut capture, _) = capture(DrawingCapability::Supported);
        capture.begin_capture().unwrap();
        let err = capture
            .on_shape_completed(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidGeometry(_)));
        assert!(capture.is_drawing());
        assert!(capture.overlays().is_empty());
    }

    #[test]
    fn test_discard_clears_overlays() {
        let (mut capture, _) = capture(DrawingCapability::Supported);
        capture.begin_capture().unwrap();
        capture.on_shape_completed(square()).unwrap();

        capture.discard_pending();
        assert!(capture.pending().is_none());
        assert!(capture.overlays().is_empty());

        // Idempotent
        capture.discard_pending();
        assert_eq!(capture.status().state, "idle");
    }

    #[test]
    fn test_save_guard() {
        let (mut capture, _) = capture(DrawingCapability::Supported);
        assert!(matches!(capture.begin_save(), Err(AppError::Validation(_))));

        capture.begin_capture().unwrap();
        capture.on_shape_completed(square()).unwrap();
        capture.begin_save().unwrap();
        assert!(matches!(capture.begin_save(), Err(AppError::Busy)));

        capture.abort_save();
        assert!(capture.pending().is_some());
        assert_eq!(capture.overlays().len(), 2);

        let ring = capture.begin_save().unwrap();
        let zone = Zone {
            id: "1".to_string(),
            name: "Downtown".to_string(),
            centroid: Coordinate::new(0.5, 0.5),
            geometry: ring,
            status: Status::Enabled,
        };
        capture.complete_save(&zone);
        assert!(capture.pending().is_none());

        let overlays = capture.overlays();
        assert_eq!(overlays.len(), 2);
        assert!(overlays.iter().any(|o| matches!(
            o,
            Overlay::Polygon { style: OverlayStyle::Persisted, .. }
        )));
    }

    type MapResult<T> = std::result::Result<T, MapError>;

    /// Scene whose toolkit cannot place markers.
    struct NoMarkers(SceneMapProvider);

    impl MapProvider for NoMarkers {
        fn init(&mut self, surface: &str, view: MapView) -> MapResult<MapInstanceId> {
            self.0.init(surface, view)
        }

        fn destroy(&mut self, instance: MapInstanceId) {
            self.0.destroy(instance)
        }

        fn draw_polygon(
            &mut self,
            instance: MapInstanceId,
            ring: &Ring,
            style: OverlayStyle,
        ) -> MapResult<OverlayId> {
            self.0.draw_polygon(instance, ring, style)
        }

        fn add_marker(
            &mut self,
            _instance: MapInstanceId,
            _at: Coordinate,
            _label: Option<&str>,
        ) -> MapResult<OverlayId> {
            Err(MapError::Toolkit("marker layer missing".to_string()))
        }

        fn remove_overlay(&mut self, instance: MapInstanceId, overlay: OverlayId) {
            self.0.remove_overlay(instance, overlay)
        }

        fn set_drawing_mode(&mut self, instance: MapInstanceId, active: bool) -> MapResult<()> {
            self.0.set_drawing_mode(instance, active)
        }

        fn overlays(&self, instance: MapInstanceId) -> Vec<Overlay> {
            self.0.overlays(instance)
        }
    }

    #[test]
    fn test_failed_marker_leaves_no_stray_polygon() {
        let scene = SceneMapProvider::new();
        let surface = MapSurface::new("zones", Box::new(NoMarkers(scene.clone())));
        let mut capture = GeometryCapture::new(surface, DrawingCapability::Supported);
        capture.init_map(MapView::default()).unwrap();

        capture.begin_capture().unwrap();
        assert!(capture.on_shape_completed(square()).is_err());
        assert!(capture.overlays().is_empty());
        assert!(capture.pending().is_none());

        let zone = Zone {
            id: "1".to_string(),
            name: "Downtown".to_string(),
            centroid: Coordinate::new(0.5, 0.5),
            geometry: Ring::new(square()).unwrap(),
            status: Status::Enabled,
        };
        assert!(capture.show_zones(&[zone]).is_err());
        assert!(capture.overlays().is_empty());
    }

    #[test]
    fn test_reinit_redraws_pending_and_zones() {
        let (mut capture, provider) = capture(DrawingCapability::Supported);
        capture.begin_capture().unwrap();
        capture.on_shape_completed(square()).unwrap();

        capture.init_map(MapView::default()).unwrap();
        capture.init_map(MapView::default()).unwrap();

        assert_eq!(provider.live_instances(), 1);
        assert!(capture.pending().is_some());
        assert_eq!(capture.overlays().len(), 2);
    }
}
