// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zone model and its backend representation.

use super::geometry::{Coordinate, Ring};
use super::wire::{deserialize_id, deserialize_opt_f64, Status};
use serde::{Deserialize, Serialize};

/// A named, persisted geographic polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Backend-assigned identifier
    pub id: String,
    /// Display label (never empty)
    pub name: String,
    /// Boundary ring; immutable once the zone exists
    pub geometry: Ring,
    /// Arithmetic mean of the ring's distinct vertices
    pub centroid: Coordinate,
    pub status: Status,
}

/// Zone record as stored by the backend.
///
/// The geometry travels packed as JSON text inside `description`.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
}

/// Body of `POST /manage-zones/managezone-save`.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneSaveRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub status: Status,
}
