// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use crate::map::MapView;
use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the zone backend (e.g. `https://api.example.com/admin`)
    pub backend_url: String,
    /// Bearer token forwarded on every backend call
    pub backend_token: String,
    /// Dashboard URL allowed by CORS
    pub frontend_url: String,
    /// Gateway port
    pub port: u16,
    /// Backend request timeout in seconds
    pub http_timeout_secs: u64,
    /// Whether the polygon drawing plugin is available to operators
    pub drawing_enabled: bool,
    /// Initial map viewport
    pub map_view: MapView,
}

impl Config {
    /// Config for tests, pointing at the given backend.
    pub fn test_default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:9".to_string(),
            backend_token: "test_token".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            http_timeout_secs: 5,
            drawing_enabled: true,
            map_view: MapView::default(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = MapView::default();

        Ok(Self {
            backend_url: env::var("BACKEND_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("BACKEND_URL"))?,
            backend_token: env::var("BACKEND_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("BACKEND_TOKEN"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_or("PORT", 8080)?,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", 30)?,
            drawing_enabled: parse_or("DRAWING_ENABLED", true)?,
            map_view: MapView {
                center_lat: parse_or("MAP_CENTER_LAT", defaults.center_lat)?,
                center_lng: parse_or("MAP_CENTER_LNG", defaults.center_lng)?,
                zoom: parse_or("MAP_ZOOM", defaults.zoom)?,
            },
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
