//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use zapflow_core::{FlowError, NodeViolation};
use zapflow_storage::StorageError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details (e.g., validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors with HTTP status code mapping.
///
/// Each variant maps to a specific HTTP status code and produces a structured
/// JSON error response body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Flow validation failed with per-node violations (422).
    #[error("validation failed")]
    ValidationFailed(Vec<NodeViolation>),

    /// Resource conflict (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Upstream Evolution API failure (502).
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ApiErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorDetail {
                    code: "BAD_REQUEST".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            ApiError::ValidationFailed(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorDetail {
                    code: "VALIDATION_FAILED".to_string(),
                    message: format!("{} node(s) failed validation", violations.len()),
                    details: serde_json::to_value(violations).ok(),
                },
            ),
            ApiError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ApiErrorDetail {
                    code: "CONFLICT".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            ApiError::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorDetail {
                    code: "UPSTREAM_ERROR".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
            ApiError::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                    details: None,
                },
            ),
        };

        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        match &err {
            FlowError::NodeNotFound { .. } | FlowError::EdgeNotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            FlowError::NoTriggerNode => ApiError::BadRequest(err.to_string()),
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::FlowNotFound(_) | StorageError::InstanceNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            _ => ApiError::InternalError(err.to_string()),
        }
    }
}
