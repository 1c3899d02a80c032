//! HTTP handlers for the tenant API.

use crate::error::TenantApiError;
use crate::models::{
    RegisterTenantRequest, TenantView, UpdateQuotasRequest, UpdateStatusRequest,
};
use crate::router::TenantApiState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tombola_core::TenantId;
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

fn parse_tenant_id(raw: &str) -> Result<TenantId, TenantApiError> {
    raw.parse()
        .map_err(|_| TenantApiError::Validation("invalid tenant id".to_string()))
}

/// Register a new tenant.
#[utoipa::path(
    post,
    path = "/api/tenant/register",
    request_body = RegisterTenantRequest,
    responses(
        (status = 201, description = "Tenant created", body = TenantView),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Tenant code already exists"),
    ),
    tag = "Tenants"
)]
pub async fn register_handler(
    State(state): State<TenantApiState>,
    Json(request): Json<RegisterTenantRequest>,
) -> Result<(StatusCode, Json<TenantView>), TenantApiError> {
    request
        .validate()
        .map_err(|e| TenantApiError::Validation(validation_errors(&e)))?;

    let tenant = state.service.register(&request).await?;
    Ok((StatusCode::CREATED, Json(tenant)))
}

/// The authenticated tenant's own record.
#[utoipa::path(
    get,
    path = "/api/tenant/info",
    responses(
        (status = 200, description = "Tenant record", body = TenantView),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "Tenants"
)]
pub async fn info_handler(
    State(state): State<TenantApiState>,
    ctx: AuthContext,
) -> Result<Json<TenantView>, TenantApiError> {
    let tenant = state.service.info(&ctx.tenant_id).await?;
    Ok(Json(tenant))
}

/// List all tenants (admin).
#[utoipa::path(
    get,
    path = "/api/tenant/list",
    responses(
        (status = 200, description = "All tenants", body = [TenantView]),
        (status = 403, description = "Admin role required"),
    ),
    tag = "Tenants"
)]
pub async fn list_handler(
    State(state): State<TenantApiState>,
) -> Result<Json<Vec<TenantView>>, TenantApiError> {
    let tenants = state.service.list().await?;
    Ok(Json(tenants))
}

/// Change a tenant's lifecycle status (admin).
#[utoipa::path(
    put,
    path = "/api/tenant/{tenant_id}/status",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated tenant", body = TenantView),
        (status = 404, description = "Tenant not found"),
    ),
    tag = "Tenants"
)]
pub async fn update_status_handler(
    State(state): State<TenantApiState>,
    Path(tenant_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<TenantView>, TenantApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    let tenant = state
        .service
        .update_status(&tenant_id, request.status)
        .await?;
    Ok(Json(tenant))
}

/// Adjust a tenant's quotas (admin).
#[utoipa::path(
    put,
    path = "/api/tenant/{tenant_id}/quotas",
    params(("tenant_id" = String, Path, description = "Tenant ID")),
    request_body = UpdateQuotasRequest,
    responses(
        (status = 200, description = "Updated tenant", body = TenantView),
        (status = 404, description = "Tenant not found"),
    ),
    tag = "Tenants"
)]
pub async fn update_quotas_handler(
    State(state): State<TenantApiState>,
    Path(tenant_id): Path<String>,
    Json(request): Json<UpdateQuotasRequest>,
) -> Result<Json<TenantView>, TenantApiError> {
    request
        .validate()
        .map_err(|e| TenantApiError::Validation(validation_errors(&e)))?;

    let tenant_id = parse_tenant_id(&tenant_id)?;
    let tenant = state
        .service
        .update_quotas(
            &tenant_id,
            request.max_users,
            request.max_activities,
            request.storage_quota_mb,
        )
        .await?;
    Ok(Json(tenant))
}
