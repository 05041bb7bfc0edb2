// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zone-Admin: geofenced zones and zone pricing for a ride-hailing dashboard
//!
//! This crate lets operators outline service zones on a map, persists them
//! through the platform's REST backend, and manages per-zone, per-service
//! fare rules. A small gateway exposes the same operations to the dashboard.

pub mod config;
pub mod error;
pub mod map;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use map::{DrawingCapability, MapProvider, MapSurface};
use services::{BackendClient, GeometryCapture, ZonePricingTable, ZoneRegistry};
use tokio::sync::Mutex;

/// Name of the map surface zones are drawn on.
pub const ZONE_MAP_SURFACE: &str = "zone-map";

/// Shared application state.
///
/// Each component sits behind its own lock; handlers never hold two at once.
pub struct AppState {
    pub config: Config,
    pub capture: Mutex<GeometryCapture>,
    pub zones: Mutex<ZoneRegistry>,
    pub pricing: Mutex<ZonePricingTable>,
}

impl AppState {
    /// Wire up the components and initialize the zone map.
    pub fn new(config: Config, provider: Box<dyn MapProvider>) -> error::Result<Self> {
        let backend = BackendClient::new(&config)?;

        let capability = if config.drawing_enabled {
            DrawingCapability::Supported
        } else {
            DrawingCapability::Unavailable("the drawing plugin is disabled".to_string())
        };

        let mut capture =
            GeometryCapture::new(MapSurface::new(ZONE_MAP_SURFACE, provider), capability);
        capture.init_map(config.map_view)?;

        Ok(Self {
            capture: Mutex::new(capture),
            zones: Mutex::new(ZoneRegistry::new(backend.clone())),
            pricing: Mutex::new(ZonePricingTable::new(backend)),
            config,
        })
    }
}
