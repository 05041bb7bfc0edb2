// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST client for the zone backend.
//!
//! Every endpoint answers with an `{success, data, message}` envelope.
//! Transport failures, non-2xx statuses and `success: false` all surface as
//! [`AppError::Persistence`] carrying the server's message when there is one.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ApiEnvelope, Service, ZonePrice, ZonePriceForm, ZoneRecord, ZoneSaveRequest};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Backend paths, relative to the configured base URL.
pub mod endpoints {
    pub const ZONE_LIST: &str = "/manage-zones/managezone-list";
    pub const ZONE_SAVE: &str = "/manage-zones/managezone-save";
    pub const ZONE_PRICES: &str = "/manage-zones/zone-prices";
    pub const SERVICE_LIST: &str = "/services/service-list";
}

/// Bearer-authenticated backend client. Cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            token: config.backend_token.clone(),
        })
    }

    // ─── Zones ───────────────────────────────────────────────────

    pub async fn list_zones(&self) -> Result<Vec<ZoneRecord>> {
        Ok(self
            .request::<(), _>(Method::GET, endpoints::ZONE_LIST, None)
            .await?
            .unwrap_or_default())
    }

    /// Create a zone and return the stored record.
    pub async fn save_zone(&self, body: &ZoneSaveRequest) -> Result<ZoneRecord> {
        self.request(Method::POST, endpoints::ZONE_SAVE, Some(body))
            .await?
            .ok_or_else(|| AppError::Persistence("Backend did not return the saved zone".to_string()))
    }

    // ─── Zone Prices ─────────────────────────────────────────────

    /// Fetch all fare rules. Rows that cannot be read are skipped.
    pub async fn list_zone_prices(&self) -> Result<Vec<ZonePrice>> {
        let rows: Vec<serde_json::Value> = self
            .request::<(), _>(Method::GET, endpoints::ZONE_PRICES, None)
            .await?
            .unwrap_or_default();

        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<ZonePrice>(row) {
                Ok(price) => Some(price),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable zone price");
                    None
                }
            })
            .collect())
    }

    pub async fn create_zone_price(&self, form: &ZonePriceForm) -> Result<()> {
        self.request::<_, serde_json::Value>(Method::POST, endpoints::ZONE_PRICES, Some(form))
            .await?;
        Ok(())
    }

    pub async fn update_zone_price(&self, id: &str, form: &ZonePriceForm) -> Result<()> {
        let path = format!("{}/{}", endpoints::ZONE_PRICES, id);
        self.request::<_, serde_json::Value>(Method::PUT, &path, Some(form))
            .await?;
        Ok(())
    }

    // ─── Services ────────────────────────────────────────────────

    pub async fn list_services(&self) -> Result<Vec<Service>> {
        Ok(self
            .request::<(), _>(Method::GET, endpoints::SERVICE_LIST, None)
            .await?
            .unwrap_or_default())
    }

    /// Send a request and unwrap the response envelope.
    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, path, "Backend request");

        let mut request = self.http.request(method, &url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "Backend unreachable");
            AppError::Persistence(format!("Backend unreachable: {}", e))
        })?;

        Self::read_envelope(path, response).await
    }

    async fn read_envelope<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<Option<T>> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Persistence(format!("Failed to read backend response: {}", e)))?;

        if !status.is_success() {
            // Error bodies usually still carry the envelope message.
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&text)
                .ok()
                .and_then(|env| env.message)
                .unwrap_or_default();
            tracing::warn!(path, status = status.as_u16(), body = %text, "Backend rejected request");
            return Err(AppError::Persistence(message));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&text).map_err(|e| {
            AppError::Persistence(format!("Malformed backend response: {}", e))
        })?;

        if !envelope.success {
            tracing::warn!(path, message = ?envelope.message, "Backend reported failure");
            return Err(AppError::Persistence(envelope.message.unwrap_or_default()));
        }

        Ok(envelope.data)
    }
}
