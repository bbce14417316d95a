//! API error handling
//!
//! One mapping from internal failures onto HTTP: duplicates answer 409,
//! broken references and bad input 400, unknown records 404, clearinghouse
//! trouble 502/504. Nothing is retried; the caller decides what to do.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited by the clearinghouse")]
    RateLimited,

    #[error("Clearinghouse unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Clearinghouse timed out: {0}")]
    UpstreamTimeout(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Rate limited by the clearinghouse".to_string(),
            ),
            ApiError::UpstreamUnavailable(msg) => {
                (StatusCode::BAD_GATEWAY, "upstream_unavailable", msg.clone())
            }
            ApiError::UpstreamTimeout(msg) => {
                (StatusCode::GATEWAY_TIMEOUT, "upstream_timeout", msg.clone())
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { .. } => ApiError::NotFound(error.to_string()),
            PortError::Validation { message } => ApiError::BadRequest(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::RateLimited { .. } => ApiError::RateLimited,
            PortError::Timeout { .. } => ApiError::UpstreamTimeout(error.to_string()),
            PortError::Connection { message } => ApiError::UpstreamUnavailable(message),
            PortError::ServiceUnavailable { service } => ApiError::UpstreamUnavailable(service),
            PortError::Unauthorized { message } => ApiError::UpstreamUnavailable(message),
            PortError::Internal { message } => ApiError::Internal(message),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(errors.to_string())
    }
}
