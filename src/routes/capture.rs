// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geometry capture and map scene routes.

use crate::error::Result;
use crate::map::Overlay;
use crate::models::Coordinate;
use crate::services::capture::{CaptureNotice, CaptureStatus, PendingShape};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/capture", get(get_capture).delete(discard_capture))
        .route("/api/capture/begin", post(begin_capture))
        .route("/api/capture/shape", post(complete_shape))
        .route("/api/map/init", post(init_map))
        .route("/api/map/overlays", get(get_overlays))
}

async fn get_capture(State(state): State<Arc<AppState>>) -> Json<CaptureStatus> {
    Json(state.capture.lock().await.status())
}

async fn begin_capture(State(state): State<Arc<AppState>>) -> Result<Json<CaptureNotice>> {
    let notice = state.capture.lock().await.begin_capture()?;
    Ok(Json(notice))
}

#[derive(Deserialize)]
struct ShapeRequest {
    coordinates: Vec<Coordinate>,
}

/// Called by the dashboard when the operator closes the outline.
async fn complete_shape(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ShapeRequest>,
) -> Result<Json<PendingShape>> {
    let shape = state
        .capture
        .lock()
        .await
        .on_shape_completed(body.coordinates)?;
    Ok(Json(shape))
}

async fn discard_capture(State(state): State<Arc<AppState>>) -> Json<CaptureStatus> {
    let mut capture = state.capture.lock().await;
    capture.discard_pending();
    Json(capture.status())
}

/// Rebuild the map scene, e.g. after the dashboard reloads.
async fn init_map(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Overlay>>> {
    let mut capture = state.capture.lock().await;
    capture.init_map(state.config.map_view)?;
    Ok(Json(capture.overlays()))
}

async fn get_overlays(State(state): State<Arc<AppState>>) -> Json<Vec<Overlay>> {
    Json(state.capture.lock().await.overlays())
}
