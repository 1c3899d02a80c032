//! Error responses for the authorization guards.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Errors produced by the authorization guards.
///
/// The authentication gate itself never fails a request — it degrades to the
/// anonymous context. These errors come from [`crate::require_auth`] and
/// [`crate::require_role`] on routes that demand an authenticated caller.
#[derive(Debug, Clone, Error)]
pub enum GateError {
    /// No authenticated identity on the request.
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated, but the role does not satisfy the route's requirement.
    #[error("Insufficient role: {0} required")]
    Forbidden(&'static str),
}

impl GateError {
    /// The HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::Unauthorized => StatusCode::UNAUTHORIZED,
            GateError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Machine-readable error code for the JSON body.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            GateError::Unauthorized => "unauthorized",
            GateError::Forbidden(_) => "forbidden",
        }
    }
}

/// Structured JSON error body.
///
/// ```json
/// {"error": "unauthorized", "message": "Authentication required"}
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl From<GateError> for ErrorResponse {
    fn from(err: GateError) -> Self {
        Self {
            error: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from(self);

        (
            status,
            [("content-type", "application/json")],
            serde_json::to_string(&body).unwrap_or_else(|_| {
                r#"{"error":"internal_error","message":"Failed to serialize error"}"#.to_string()
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_status() {
        assert_eq!(GateError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(GateError::Unauthorized.error_code(), "unauthorized");
    }

    #[test]
    fn test_forbidden_status() {
        let err = GateError::Forbidden("ADMIN");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Insufficient role: ADMIN required");
    }

    #[test]
    fn test_error_response_serialization() {
        let body = ErrorResponse::from(GateError::Unauthorized);
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""error":"unauthorized""#));
        assert!(json.contains(r#""message":"Authentication required""#));
    }
}
