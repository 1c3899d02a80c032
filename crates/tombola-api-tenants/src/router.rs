//! Router configuration for the tenant API.

use crate::handlers::{
    info_handler, list_handler, register_handler, update_quotas_handler, update_status_handler,
};
use crate::services::TenantService;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tombola_db::TenantPool;
use tombola_tenant::{require_admin, require_auth};

/// Shared state for the tenant routes.
#[derive(Clone)]
pub struct TenantApiState {
    /// The tenant service.
    pub service: Arc<TenantService>,
}

/// Builds the tenant router, mounted under `/api/tenant`.
///
/// `register` is public (new tenants have no credentials yet); `info`
/// requires authentication; the administrative routes require the ADMIN
/// role.
pub fn tenant_router(pool: TenantPool) -> Router {
    let state = TenantApiState {
        service: Arc::new(TenantService::new(pool)),
    };

    let public = Router::new().route("/register", post(register_handler));

    let authenticated = Router::new()
        .route("/info", get(info_handler))
        .layer(middleware::from_fn(require_auth));

    let admin = Router::new()
        .route("/list", get(list_handler))
        .route("/:tenant_id/status", put(update_status_handler))
        .route("/:tenant_id/quotas", put(update_quotas_handler))
        .layer(middleware::from_fn(require_admin));

    public.merge(authenticated).merge(admin).with_state(state)
}
