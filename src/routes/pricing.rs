// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zone pricing routes.

use crate::error::{AppError, Result};
use crate::models::{ZonePrice, ZonePriceForm};
use crate::services::pricing::{EditorState, SelectOption, SubmitState};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/zone-prices", get(list_prices))
        .route("/api/zone-prices/options", get(get_options))
        .route(
            "/api/zone-prices/editor",
            get(get_editor).post(open_editor).delete(close_editor),
        )
        .route("/api/zone-prices/submit", post(submit))
        .route("/api/zone-prices/{id}", delete(delete_price))
        .route("/api/zone-prices/{id}/estimate", get(estimate))
}

/// Table row with display names resolved.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonePriceRow {
    #[serde(flatten)]
    pub price: ZonePrice,
    pub zone_name: String,
    pub service_name: String,
}

impl From<&ZonePrice> for ZonePriceRow {
    fn from(price: &ZonePrice) -> Self {
        Self {
            zone_name: price.zone_name().to_string(),
            service_name: price.service_name().to_string(),
            price: price.clone(),
        }
    }
}

fn rows(prices: &[ZonePrice]) -> Vec<ZonePriceRow> {
    prices.iter().map(ZonePriceRow::from).collect()
}

async fn list_prices(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ZonePriceRow>>> {
    let mut table = state.pricing.lock().await;
    let prices = table.list_prices().await?;
    Ok(Json(rows(prices)))
}

#[derive(Serialize)]
pub struct SelectorOptions {
    pub zones: Vec<SelectOption>,
    pub services: Vec<SelectOption>,
}

/// Zone options come from the last zone listing; services are fetched.
async fn get_options(State(state): State<Arc<AppState>>) -> Result<Json<SelectorOptions>> {
    let mut table = state.pricing.lock().await;
    let services = table.load_service_options().await?.to_vec();
    Ok(Json(SelectorOptions {
        zones: table.zone_options().to_vec(),
        services,
    }))
}

#[derive(Serialize)]
pub struct EditorView {
    pub editor: EditorState,
    pub form: ZonePriceForm,
    pub submit: SubmitState,
}

#[derive(Deserialize)]
struct OpenEditorRequest {
    /// Existing rule to edit; omit to create
    #[serde(default)]
    id: Option<String>,
}

async fn get_editor(State(state): State<Arc<AppState>>) -> Json<EditorView> {
    let table = state.pricing.lock().await;
    Json(EditorView {
        editor: table.editor().clone(),
        form: table.form().clone(),
        submit: table.submit_state().clone(),
    })
}

async fn open_editor(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OpenEditorRequest>,
) -> Result<Json<EditorView>> {
    let mut table = state.pricing.lock().await;

    if table.submit_state() == &SubmitState::Submitting {
        return Err(AppError::Busy);
    }

    let existing = match body.id {
        Some(id) => Some(
            table
                .find(&id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Zone price {} not found", id)))?,
        ),
        None => None,
    };

    let form = table.open_editor(existing.as_ref()).clone();
    Ok(Json(EditorView {
        editor: table.editor().clone(),
        form,
        submit: table.submit_state().clone(),
    }))
}

async fn close_editor(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    state.pricing.lock().await.close_editor()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Save the editor form.
///
/// The table lock is dropped while the backend call runs so a concurrent
/// submit observes `Submitting` and is refused. The send and the state
/// update run in their own task, so a client hanging up mid-save cannot
/// leave the editor stuck in `Submitting`.
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ZonePriceForm>,
) -> Result<Json<Vec<ZonePriceRow>>> {
    let (pending, backend) = {
        let mut table = state.pricing.lock().await;
        let pending = table.begin_submit(form)?;
        (pending, table.backend().clone())
    };

    let state_clone = state.clone();
    let task = tokio::spawn(async move {
        let outcome = pending.send(&backend).await;
        let mut table = state_clone.pricing.lock().await;
        table.finish_submit(outcome).await?;
        Ok::<_, AppError>(rows(table.prices()))
    });

    let rows = task
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Zone price save task failed: {}", e)))??;
    Ok(Json(rows))
}

async fn delete_price(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if state.pricing.lock().await.delete_price(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Zone price {} not found", id)))
    }
}

#[derive(Deserialize)]
struct EstimateQuery {
    #[serde(default)]
    km: f64,
    #[serde(default)]
    minutes: f64,
}

#[derive(Serialize)]
pub struct EstimateResponse {
    pub fare: f64,
}

async fn estimate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<EstimateQuery>,
) -> Result<Json<EstimateResponse>> {
    let table = state.pricing.lock().await;
    let price = table
        .find(&id)
        .ok_or_else(|| AppError::NotFound(format!("Zone price {} not found", id)))?;
    Ok(Json(EstimateResponse {
        fare: price.estimate(query.km, query.minutes),
    }))
}
