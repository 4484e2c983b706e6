use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

use health_log_domain::aggregation::AggregationError;
use health_log_domain::services::ServiceError;

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self::new("internal_error", "An internal server error occurred")
    }
}

/// Confirmation body of deletes
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Errors returned by the handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    InvalidGroupBy(#[from] AggregationError),
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Service(ServiceError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::validation_error(msg.clone()))
            }
            ApiError::Service(ServiceError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, ErrorResponse::new("not_found", msg.clone()))
            }
            ApiError::Service(ServiceError::Conflict(msg)) => {
                (StatusCode::CONFLICT, ErrorResponse::new("conflict", msg.clone()))
            }
            ApiError::Service(ServiceError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse::new("unauthorized", msg.clone()))
            }
            ApiError::Service(ServiceError::Aggregation(e)) | ApiError::InvalidGroupBy(e) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new("invalid_group_by", e.to_string()))
            }
            ApiError::Service(ServiceError::Repository(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal_error())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::Validation("systolic: too low".into()), StatusCode::BAD_REQUEST, "validation_error"),
            (ServiceError::NotFound("Reading not found".into()), StatusCode::NOT_FOUND, "not_found"),
            (ServiceError::Conflict("Username taken".into()), StatusCode::CONFLICT, "conflict"),
            (ServiceError::Unauthorized("Bad password".into()), StatusCode::UNAUTHORIZED, "unauthorized"),
            (ServiceError::Repository("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        ];

        for (err, status, code) in cases {
            let (actual_status, body) = ApiError::from(err).status_and_body();
            assert_eq!(actual_status, status);
            assert_eq!(body.error, code);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let (_, body) = ApiError::from(ServiceError::Repository("SQLITE_BUSY".into())).status_and_body();
        assert!(!body.message.contains("SQLITE_BUSY"));
    }

    #[test]
    fn test_invalid_group_by() {
        let err = ApiError::from(AggregationError::InvalidGroupMode("month".into()));
        let (status, body) = err.status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "invalid_group_by");
        assert!(body.message.contains("month"));
    }
}
