// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zone registry: naming, persisting and listing zones.

use crate::error::{AppError, Result};
use crate::models::{Coordinate, Ring, Status, Zone, ZoneRecord, ZoneSaveRequest};
use crate::services::backend::BackendClient;
use crate::services::capture::GeometryCapture;
use crate::services::geometry;
use geo::{Contains, Point};
use geojson::GeoJson;

const SAVE_FAILED: &str = "Failed to save zone";
const LOAD_FAILED: &str = "Failed to load zones";

/// Service owning the locally displayed zone list.
pub struct ZoneRegistry {
    backend: BackendClient,
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    pub fn new(backend: BackendClient) -> Self {
        Self {
            backend,
            zones: Vec::new(),
        }
    }

    /// Representative point of a ring. See [`geometry::compute_centroid`].
    pub fn compute_centroid(ring: &[Coordinate]) -> Result<Coordinate> {
        geometry::compute_centroid(ring)
    }

    /// Persist a named ring.
    ///
    /// An empty name fails before any backend call. On any failure the
    /// caller's pending shape is left untouched.
    pub async fn save_zone(&mut self, name: &str, ring: &Ring, centroid: Coordinate) -> Result<Zone> {
        let name = validate_name(name)?;

        let body = ZoneSaveRequest {
            name: name.to_string(),
            latitude: centroid.lat,
            longitude: centroid.lng,
            description: geometry::encode_description(ring),
            status: Status::Enabled,
        };

        let record = self
            .backend
            .save_zone(&body)
            .await
            .map_err(|e| e.with_fallback(SAVE_FAILED))?;

        let zone = Zone {
            id: record.id,
            name: if record.name.trim().is_empty() {
                body.name
            } else {
                record.name
            },
            geometry: ring.clone(),
            centroid,
            status: record.status,
        };

        tracing::info!(zone_id = %zone.id, name = %zone.name, "Zone saved");
        self.zones.retain(|z| z.id != zone.id);
        self.zones.push(zone.clone());
        Ok(zone)
    }

    /// Save the shape pending in `capture` under `name`.
    ///
    /// The shape stays on the map, still pending, if anything fails.
    pub async fn save_captured(
        &mut self,
        capture: &mut GeometryCapture,
        name: &str,
    ) -> Result<Zone> {
        validate_name(name)?;
        let ring = capture.begin_save()?;

        let result = match Self::compute_centroid(ring.coords()) {
            Ok(centroid) => self.save_zone(name, &ring, centroid).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(zone) => capture.complete_save(zone),
            Err(_) => capture.abort_save(),
        }
        result
    }

    /// Fetch every persisted zone and refresh the local list.
    ///
    /// Records whose geometry cannot be read are skipped.
    pub async fn list_zones(&mut self) -> Result<Vec<Zone>> {
        let records = self
            .backend
            .list_zones()
            .await
            .map_err(|e| e.with_fallback(LOAD_FAILED))?;

        let total = records.len();
        self.zones = records
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone();
                match zone_from_record(record) {
                    Ok(zone) => Some(zone),
                    Err(e) => {
                        tracing::warn!(zone_id = %id, error = %e, "Skipping unreadable zone");
                        None
                    }
                }
            })
            .collect();

        tracing::debug!(total, loaded = self.zones.len(), "Zones loaded");
        Ok(self.zones.clone())
    }

    /// Zones as of the last fetch or save.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Remove a zone from the local view. The backend is not told.
    pub fn remove_zone(&mut self, id: &str) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| z.id != id);
        let removed = self.zones.len() != before;
        if removed {
            tracing::info!(zone_id = id, "Zone removed from view");
        }
        removed
    }

    /// Zones whose boundary contains `point`.
    pub fn locate(&self, point: Coordinate) -> Vec<&Zone> {
        let point = Point::new(point.lng, point.lat);
        self.zones
            .iter()
            .filter(|z| z.geometry.to_polygon().contains(&point))
            .collect()
    }

    pub fn to_geojson(&self) -> GeoJson {
        geometry::zones_to_geojson(&self.zones)
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("zone name is required".to_string()));
    }
    Ok(name)
}

/// Rebuild a zone from its backend record.
pub fn zone_from_record(record: ZoneRecord) -> Result<Zone> {
    let description = record
        .description
        .as_deref()
        .ok_or_else(|| AppError::InvalidGeometry("zone has no geometry".to_string()))?;
    let geometry = geometry::decode_description(description)?;

    let centroid = match (record.latitude, record.longitude) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Coordinate::new(lat, lng),
        _ => geometry::compute_centroid(geometry.coords())?,
    };

    Ok(Zone {
        id: record.id,
        name: record.name,
        geometry,
        centroid,
        status: record.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_centroid() {
        let record: ZoneRecord = serde_json::from_str(
            r#"{"id": 5, "name": "Harbor", "status": 1,
                "description": "{\"type\":\"polygon\",\"coordinates\":[[0,0],[0,4],[4,4],[4,0],[0,0]]}"}"#,
        )
        .unwrap();
        let zone = zone_from_record(record).unwrap();
        assert_eq!(zone.id, "5");
        assert_eq!(zone.centroid, Coordinate::new(2.0, 2.0));
    }

    #[test]
    fn test_record_without_geometry() {
        let record: ZoneRecord =
            serde_json::from_str(r#"{"id": 6, "name": "Ghost", "latitude": 1, "longitude": 2}"#)
                .unwrap();
        assert!(matches!(
            zone_from_record(record),
            Err(AppError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(matches!(validate_name("   "), Err(AppError::Validation(_))));
        assert_eq!(validate_name(" Downtown ").unwrap(), "Downtown");
    }
}
