//! Router configuration for the authentication API.

use crate::handlers::{
    login_handler, logout_handler, me_handler, refresh_handler, update_profile_handler,
};
use crate::services::AuthService;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tombola_auth::TokenCodec;
use tombola_db::TenantPool;
use tombola_tenant::require_auth;

/// Shared state for the authentication routes.
#[derive(Clone)]
pub struct AuthApiState {
    /// The authentication service.
    pub service: Arc<AuthService>,
}

/// Builds the authentication router, mounted under `/api/auth`.
///
/// `login` and `refresh` are public; the profile routes require an
/// authenticated caller.
pub fn auth_router(pool: TenantPool, codec: Arc<TokenCodec>) -> Router {
    let state = AuthApiState {
        service: Arc::new(AuthService::new(pool, codec)),
    };

    let public = Router::new()
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler));

    let authenticated = Router::new()
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .route("/profile", put(update_profile_handler))
        .layer(middleware::from_fn(require_auth));

    public.merge(authenticated).with_state(state)
}
