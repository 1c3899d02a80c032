//! HTTP handlers for the authentication API.

use crate::error::ApiAuthError;
use crate::models::{
    LoginRequest, LoginResponse, RefreshResponse, UpdateProfileRequest, UserView,
};
use crate::router::AuthApiState;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use tombola_tenant::AuthContext;
use validator::Validate;

fn validation_errors(e: &validator::ValidationErrors) -> String {
    e.field_errors()
        .values()
        .flat_map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(ToString::to_string))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, ApiAuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiAuthError::TokenInvalid)
}

/// Authenticate a user and issue a token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid tenant code, username, or password"),
        (status = 403, description = "Tenant or user is not active"),
    ),
    tag = "Authentication"
)]
pub async fn login_handler(
    State(state): State<AuthApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiAuthError> {
    request
        .validate()
        .map_err(|e| ApiAuthError::Validation(validation_errors(&e)))?;

    let response = state.service.login(&request).await?;
    Ok(Json(response))
}

/// Exchange a still-valid bearer token for a fresh one.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New token issued", body = RefreshResponse),
        (status = 401, description = "Token is invalid or expired"),
    ),
    tag = "Authentication"
)]
pub async fn refresh_handler(
    State(state): State<AuthApiState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiAuthError> {
    let token = bearer_from_headers(&headers)?;
    let refreshed = state.service.refresh(token)?;
    Ok(Json(RefreshResponse { token: refreshed }))
}

/// Acknowledge a logout.
///
/// Tokens are invalidated by expiry only (no server-side revocation list);
/// the client discards its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 204, description = "Logged out")),
    tag = "Authentication"
)]
pub async fn logout_handler(ctx: AuthContext) -> StatusCode {
    tracing::info!(user_id = %ctx.subject, tenant_id = %ctx.tenant_id, "user logged out");
    StatusCode::NO_CONTENT
}

/// The authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "Authentication"
)]
pub async fn me_handler(
    State(state): State<AuthApiState>,
    ctx: AuthContext,
) -> Result<Json<UserView>, ApiAuthError> {
    let user = state.service.current_user(&ctx.subject).await?;
    Ok(Json(user))
}

/// Self-service profile update.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserView),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "Authentication"
)]
pub async fn update_profile_handler(
    State(state): State<AuthApiState>,
    ctx: AuthContext,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserView>, ApiAuthError> {
    request
        .validate()
        .map_err(|e| ApiAuthError::Validation(validation_errors(&e)))?;

    let user = state.service.update_profile(&ctx, &request).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_from_headers(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn test_bearer_missing_header() {
        let headers = HeaderMap::new();
        assert!(bearer_from_headers(&headers).is_err());
    }

    #[test]
    fn test_bearer_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic Zm9v".parse().unwrap());
        assert!(bearer_from_headers(&headers).is_err());
    }

    #[test]
    fn test_bearer_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert!(bearer_from_headers(&headers).is_err());
    }
}
