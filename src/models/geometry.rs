// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coordinates and closed polygon rings.

use crate::error::AppError;
use geo::{BoundingRect, Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Minimum number of distinct vertices in a ring.
pub const MIN_RING_VERTICES: usize = 3;

/// A (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CoordinateWire")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// Drawing toolkits hand back either `{lat, lng}` objects or `[lat, lng]` pairs.
#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateWire {
    Object { lat: f64, lng: f64 },
    Pair([f64; 2]),
}

impl From<CoordinateWire> for Coordinate {
    fn from(wire: CoordinateWire) -> Self {
        match wire {
            CoordinateWire::Object { lat, lng } => Coordinate { lat, lng },
            CoordinateWire::Pair([lat, lng]) => Coordinate { lat, lng },
        }
    }
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    fn key(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lng.to_bits())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(c: Coordinate) -> Self {
        Coord { x: c.lng, y: c.lat }
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(c: Coord<f64>) -> Self {
        Self { lat: c.y, lng: c.x }
    }
}

/// A closed polygon boundary: first and last coordinates are identical and
/// at least [`MIN_RING_VERTICES`] distinct vertices are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coordinate>", into = "Vec<Coordinate>")]
pub struct Ring {
    coords: Vec<Coordinate>,
}

impl Ring {
    /// Build a ring from an open or closed vertex list.
    pub fn new(mut coords: Vec<Coordinate>) -> Result<Self, AppError> {
        if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
            return Err(AppError::InvalidGeometry(format!(
                "non-finite coordinate ({}, {})",
                bad.lat, bad.lng
            )));
        }

        let distinct: HashSet<(u64, u64)> = coords.iter().map(Coordinate::key).collect();
        if distinct.len() < MIN_RING_VERTICES {
            return Err(AppError::InvalidGeometry(format!(
                "a ring needs at least {} distinct vertices, got {}",
                MIN_RING_VERTICES,
                distinct.len()
            )));
        }

        if coords.first() != coords.last() {
            coords.push(coords[0]);
        }

        Ok(Self { coords })
    }

    /// All coordinates including the closing duplicate.
    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    /// Vertices without the closing duplicate.
    pub fn vertices(&self) -> &[Coordinate] {
        &self.coords[..self.coords.len() - 1]
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        self.coords.iter().copied().map(Coord::from).collect()
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(self.to_line_string(), vec![])
    }

    /// Center of the ring's bounding box, used as a preview point while a
    /// shape is pending.
    pub fn bounding_center(&self) -> Coordinate {
        // A ring always has coordinates, so the bounding rect exists.
        self.to_line_string()
            .bounding_rect()
            .map(|rect| Coordinate::from(rect.center()))
            .unwrap_or(self.coords[0])
    }
}

impl TryFrom<Vec<Coordinate>> for Ring {
    type Error = AppError;

    fn try_from(coords: Vec<Coordinate>) -> Result<Self, Self::Error> {
        Ring::new(coords)
    }
}

impl From<Ring> for Vec<Coordinate> {
    fn from(ring: Ring) -> Self {
        ring.coords
    }
}
