// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zone geometry helpers: centroid, legacy wire packing and GeoJSON export.

use crate::error::{AppError, Result};
use crate::models::{Coordinate, Ring, Zone};
use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, Geometry, JsonObject};
use serde::Deserialize;

/// Geometry type tag used by the backend's packed `description` field.
const LEGACY_GEOMETRY_TYPE: &str = "polygon";

/// Arithmetic mean of a ring's distinct vertices.
///
/// The closing duplicate is ignored and non-finite pairs are skipped. Fails
/// when nothing usable is left, before any division happens.
pub fn compute_centroid(ring: &[Coordinate]) -> Result<Coordinate> {
    let open = match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    };

    let (count, lat_sum, lng_sum) = open
        .iter()
        .filter(|c| c.is_finite())
        .fold((0usize, 0.0f64, 0.0f64), |(n, lat, lng), c| {
            (n + 1, lat + c.lat, lng + c.lng)
        });

    if count == 0 {
        return Err(AppError::InvalidGeometry(
            "no usable coordinate pairs".to_string(),
        ));
    }

    Ok(Coordinate::new(
        lat_sum / count as f64,
        lng_sum / count as f64,
    ))
}

#[derive(Deserialize)]
struct PackedGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<Coordinate>,
}

/// Pack a ring into the backend's `description` text.
pub fn encode_description(ring: &Ring) -> String {
    let pairs: Vec<[f64; 2]> = ring.coords().iter().map(|c| [c.lat, c.lng]).collect();
    serde_json::json!({
        "type": LEGACY_GEOMETRY_TYPE,
        "coordinates": pairs,
    })
    .to_string()
}

/// Unpack a ring from the backend's `description` text.
pub fn decode_description(text: &str) -> Result<Ring> {
    let packed: PackedGeometry = serde_json::from_str(text)
        .map_err(|e| AppError::InvalidGeometry(format!("unreadable geometry payload: {}", e)))?;

    if !packed.kind.eq_ignore_ascii_case(LEGACY_GEOMETRY_TYPE) {
        return Err(AppError::InvalidGeometry(format!(
            "unsupported geometry type {:?}",
            packed.kind
        )));
    }

    Ring::new(packed.coordinates)
}

/// Export zones as a GeoJSON `FeatureCollection`.
pub fn zones_to_geojson(zones: &[Zone]) -> GeoJson {
    let features = zones
        .iter()
        .map(|zone| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), zone.name.clone().into());
            properties.insert("status".to_string(), serde_json::json!(zone.status));
            properties.insert(
                "centroid".to_string(),
                serde_json::json!([zone.centroid.lng, zone.centroid.lat]),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(
                    &zone.geometry.to_polygon(),
                ))),
                id: Some(Id::String(zone.id.clone())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}
