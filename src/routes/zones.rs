// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zone registry routes.

use crate::error::{AppError, Result};
use crate::models::{Coordinate, Zone};
use crate::services::ZoneRegistry;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/zones", get(list_zones).post(save_zone))
        .route("/api/zones/geojson", get(zones_geojson))
        .route("/api/zones/locate", get(locate))
        .route("/api/zones/{id}", delete(remove_zone))
}

/// Refresh zones from the backend and push them to the map and the pricing
/// zone selector.
async fn list_zones(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Zone>>> {
    let zones = state.zones.lock().await.list_zones().await?;

    if let Err(e) = state.capture.lock().await.show_zones(&zones) {
        tracing::warn!(error = %e, "Zones could not be drawn");
    }
    state.pricing.lock().await.set_zone_options(&zones);

    Ok(Json(zones))
}

#[derive(Deserialize)]
struct SaveZoneRequest {
    #[serde(default)]
    name: String,
}

/// Persist the pending captured shape under a name.
///
/// The capture lock is released while the backend call runs, so a second
/// save attempt sees the save in flight and is refused. The save runs in its
/// own task so a dropped request cannot leave the capture in `Saving`.
async fn save_zone(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveZoneRequest>,
) -> Result<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("zone name is required".to_string()));
    }

    let ring = state.capture.lock().await.begin_save()?;

    let state_clone = state.clone();
    let task = tokio::spawn(async move {
        let state = state_clone;
        let result = match ZoneRegistry::compute_centroid(ring.coords()) {
            Ok(centroid) => {
                state
                    .zones
                    .lock()
                    .await
                    .save_zone(&body.name, &ring, centroid)
                    .await
            }
            Err(e) => Err(e),
        };

        let zone = {
            let mut capture = state.capture.lock().await;
            match result {
                Ok(zone) => {
                    capture.complete_save(&zone);
                    zone
                }
                Err(e) => {
                    capture.abort_save();
                    return Err(e);
                }
            }
        };

        let zones = state.zones.lock().await.zones().to_vec();
        state.pricing.lock().await.set_zone_options(&zones);
        Ok(zone)
    });

    let zone = task
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Zone save task failed: {}", e)))??;
    Ok((StatusCode::CREATED, Json(zone)))
}

async fn remove_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let zones = {
        let mut registry = state.zones.lock().await;
        if !registry.remove_zone(&id) {
            return Err(AppError::NotFound(format!("Zone {} not found", id)));
        }
        registry.zones().to_vec()
    };

    state.capture.lock().await.hide_zone(&id);
    state.pricing.lock().await.set_zone_options(&zones);
    Ok(StatusCode::NO_CONTENT)
}

async fn zones_geojson(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let geojson = state.zones.lock().await.to_geojson();
    (
        [(header::CONTENT_TYPE, "application/geo+json")],
        geojson.to_string(),
    )
}

#[derive(Deserialize)]
struct LocateQuery {
    lat: f64,
    lng: f64,
}

async fn locate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LocateQuery>,
) -> Result<Json<Vec<Zone>>> {
    let point = Coordinate::new(query.lat, query.lng);
    if !point.is_finite() {
        return Err(AppError::Validation("lat and lng must be finite".to_string()));
    }
    let registry = state.zones.lock().await;
    Ok(Json(registry.locate(point).into_iter().cloned().collect()))
}
