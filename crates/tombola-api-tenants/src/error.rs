//! Error types for the tenant API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tombola_db::DbError;

/// Errors returned by tenant endpoints.
#[derive(Debug, Error)]
pub enum TenantApiError {
    /// The requested tenant code is already registered.
    #[error("Tenant code already exists")]
    CodeTaken,

    /// Tenant not found.
    #[error("Tenant not found")]
    NotFound,

    /// Request input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database failure.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl TenantApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            TenantApiError::CodeTaken => (StatusCode::CONFLICT, "conflict"),
            TenantApiError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            TenantApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            TenantApiError::Database(_) | TenantApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for TenantApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            TenantApiError::Database(err) => {
                tracing::error!(error = %err, "tenant endpoint database failure");
                "Internal error".to_string()
            }
            TenantApiError::Internal(msg) => {
                tracing::error!(error = %msg, "tenant endpoint failure");
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_taken_is_conflict() {
        assert_eq!(
            TenantApiError::CodeTaken.status_and_code(),
            (StatusCode::CONFLICT, "conflict")
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(
            TenantApiError::NotFound.status_and_code().0,
            StatusCode::NOT_FOUND
        );
    }
}
