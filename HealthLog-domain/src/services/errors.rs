use thiserror::Error;
use tracing::error;
use validator::{Validate, ValidationErrors};

use health_log_data::repository::RepositoryError;

use crate::aggregation::AggregationError;

/// Errors returned by the domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record does not exist or belongs to another user
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record collides with an existing one
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Storage failure
    #[error("Repository error: {0}")]
    Repository(String),

    /// Aggregation contract violation
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

/// Map repository errors to service errors
pub(crate) fn map_repo_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
        RepositoryError::Conflict(msg) => ServiceError::Conflict(msg),
        other => {
            error!("Repository failure: {}", other);
            ServiceError::Repository(other.to_string())
        }
    }
}

/// Render validator errors as `field: message` pairs, sorted by field
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            if field == "__all__" {
                messages.join(", ")
            } else {
                format!("{}: {}", field, messages.join(", "))
            }
        })
        .collect::<Vec<String>>()
        .join("; ")
}

/// Run the request's validator rules
pub(crate) fn validate_request<T: Validate>(request: &T) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|errors| ServiceError::Validation(format_validation_errors(&errors)))
}
