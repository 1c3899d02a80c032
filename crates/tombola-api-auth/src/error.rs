//! Error types for the authentication API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tombola_db::DbError;

/// Errors returned by authentication endpoints.
#[derive(Debug, Error)]
pub enum ApiAuthError {
    /// Wrong tenant code, username, or password. Deliberately generic so the
    /// response does not reveal which part was wrong.
    #[error("Invalid tenant code, username, or password")]
    InvalidCredentials,

    /// The tenant exists but is suspended.
    #[error("Tenant is suspended")]
    TenantSuspended,

    /// The user account is disabled.
    #[error("User account is disabled")]
    UserDisabled,

    /// The presented token failed verification.
    #[error("Token is invalid or expired")]
    TokenInvalid,

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

impl ApiAuthError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiAuthError::InvalidCredentials | ApiAuthError::TokenInvalid => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            ApiAuthError::TenantSuspended | ApiAuthError::UserDisabled => {
                (StatusCode::FORBIDDEN, "forbidden")
            }
            ApiAuthError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiAuthError::Database(_) | ApiAuthError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Database details stay in the logs, not in the response.
        let message = match &self {
            ApiAuthError::Database(err) => {
                tracing::error!(error = %err, "authentication endpoint database failure");
                "Internal error".to_string()
            }
            ApiAuthError::Internal(msg) => {
                tracing::error!(error = %msg, "authentication endpoint failure");
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
    fn test_invalid_credentials_is_generic() {
        let message = ApiAuthError::InvalidCredentials.to_string();
        assert!(message.contains("tenant code, username, or password"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiAuthError::InvalidCredentials.status_and_code().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiAuthError::TenantSuspended.status_and_code().0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiAuthError::Validation("bad".into()).status_and_code().0,
            StatusCode::BAD_REQUEST
        );
    }
}
