// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Client-detected input problem. Never reaches the network layer.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backend rejected the write or could not be reached.
    #[error("{0}")]
    Persistence(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A save for the same form is already in flight.
    #[error("A save is already in progress")]
    Busy,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Replace an empty persistence message with a generic one.
    ///
    /// The backend does not always explain a rejection; the operator still
    /// needs something to read.
    pub fn with_fallback(self, fallback: &str) -> Self {
        match self {
            AppError::Persistence(msg) if msg.trim().is_empty() => {
                AppError::Persistence(fallback.to_string())
            }
            other => other,
        }
    }

    /// Whether the operator can simply retry the same action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Persistence(_) | AppError::Busy)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid".to_string());
                format!("{}: {}", field, reason)
            })
            .collect();
        fields.sort();
        AppError::Validation(fields.join(", "))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
            }
            AppError::Persistence(msg) => {
                tracing::warn!(error = %msg, "Backend persistence failure");
                (StatusCode::BAD_GATEWAY, "persistence_error", Some(msg.clone()))
            }
            AppError::InvalidGeometry(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_geometry",
                Some(msg.clone()),
            ),
            AppError::Busy => (StatusCode::CONFLICT, "busy", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;
