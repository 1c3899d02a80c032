//! Error types for the lottery API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tombola_db::DbError;

/// Errors returned by lottery endpoints.
#[derive(Debug, Error)]
pub enum LotteryApiError {
    /// A referenced activity, prize, or participant does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The participant has already won in this activity.
    #[error("Participant has already won in this activity")]
    AlreadyWon,

    /// The prize has no quota left to draw.
    #[error("Prize quota exhausted")]
    QuotaExhausted,

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

impl LotteryApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            LotteryApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            LotteryApiError::AlreadyWon | LotteryApiError::QuotaExhausted => {
                (StatusCode::CONFLICT, "conflict")
            }
            LotteryApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            LotteryApiError::Database(_) | LotteryApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for LotteryApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            LotteryApiError::Database(err) => {
                tracing::error!(error = %err, "lottery endpoint database failure");
                "Internal error".to_string()
            }
            LotteryApiError::Internal(msg) => {
                tracing::error!(error = %msg, "lottery endpoint failure");
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
    fn test_not_found_names_the_resource() {
        let err = LotteryApiError::NotFound("activity a1".to_string());
        assert_eq!(err.to_string(), "activity a1 not found");
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_draw_conflicts() {
        assert_eq!(
            LotteryApiError::AlreadyWon.status_and_code().0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            LotteryApiError::QuotaExhausted.status_and_code().0,
            StatusCode::CONFLICT
        );
    }
}
