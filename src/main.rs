// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zone-Admin Gateway
//!
//! Serves zone capture, zone registry and zone pricing operations to the
//! admin dashboard, backed by the platform's REST API.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zone_admin::{config::Config, map::SceneMapProvider, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = %config.backend_url,
        drawing_enabled = config.drawing_enabled,
        "Starting Zone-Admin gateway"
    );

    let state = Arc::new(AppState::new(
        config.clone(),
        Box::new(SceneMapProvider::new()),
    )?);

    // Warm the zone list so the map and the pricing selector start populated.
    // A backend outage here is not fatal; the dashboard can refresh later.
    let zones = state.zones.lock().await.list_zones().await;
    match zones {
        Ok(zones) => {
            state.capture.lock().await.show_zones(&zones)?;
            state.pricing.lock().await.set_zone_options(&zones);
            tracing::info!(count = zones.len(), "Zones loaded");
        }
        Err(e) => tracing::warn!(error = %e, "Initial zone load failed"),
    }

    // Build router
    let app = zone_admin::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zone_admin=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
