//! Authentication service: the login/refresh/profile flows.

use crate::error::ApiAuthError;
use crate::models::{LoginRequest, LoginResponse, UpdateProfileRequest, UserView};
use std::sync::Arc;
use tombola_auth::{verify_password, TokenCodec};
use tombola_core::UserId;
use tombola_db::models::{Tenant, User};
use tombola_db::TenantPool;
use tombola_tenant::{bind_tenant, clear_tenant, AuthContext};

/// Orchestrates the authentication flows against the registry and the
/// tenant schemas.
#[derive(Clone)]
pub struct AuthService {
    pool: TenantPool,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    /// Creates the service over the routed pool and the shared codec.
    #[must_use]
    pub fn new(pool: TenantPool, codec: Arc<TokenCodec>) -> Self {
        Self { pool, codec }
    }

    /// Authenticates a user and issues a token.
    ///
    /// Resolves the tenant by code from the registry (schema-exempt), binds
    /// the tenant context, then fetches the user through the statement
    /// router like any other tenant-scoped query. The binding is cleared
    /// before returning — login must not leave a context for the rest of an
    /// anonymous request.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiAuthError> {
        let tenant = Tenant::find_by_code(self.pool.registry(), &request.tenant_code)
            .await?
            .ok_or_else(|| {
                tracing::warn!(tenant_code = %request.tenant_code, "login for unknown tenant code");
                ApiAuthError::InvalidCredentials
            })?;

        if !tenant.is_active() {
            tracing::warn!(tenant_id = %tenant.tenant_id, "login against suspended tenant");
            return Err(ApiAuthError::TenantSuspended);
        }

        bind_tenant(tenant.tenant_id.clone());
        let result = self.login_in_tenant(&tenant, request).await;
        clear_tenant();
        result
    }

    async fn login_in_tenant(
        &self,
        tenant: &Tenant,
        request: &LoginRequest,
    ) -> Result<LoginResponse, ApiAuthError> {
        let mut conn = self.pool.conn().await?;

        let user = User::find_by_username(&mut conn, &request.username)
            .await?
            .ok_or(ApiAuthError::InvalidCredentials)?;

        let password_ok = verify_password(&request.password, &user.password_hash)
            .map_err(|e| ApiAuthError::Internal(e.to_string()))?;
        if !password_ok {
            tracing::warn!(
                tenant_id = %tenant.tenant_id,
                username = %request.username,
                "wrong password"
            );
            return Err(ApiAuthError::InvalidCredentials);
        }

        if !user.is_active() {
            return Err(ApiAuthError::UserDisabled);
        }

        let token = self
            .codec
            .issue(&user.user_id, &tenant.tenant_id, &user.username, user.role)
            .map_err(|e| ApiAuthError::Internal(e.to_string()))?;

        User::touch_last_login(&mut conn, &user.user_id).await?;

        tracing::info!(
            tenant_id = %tenant.tenant_id,
            user_id = %user.user_id,
            "login succeeded"
        );

        Ok(LoginResponse {
            token,
            user: UserView::from(user),
            tenant_code: tenant.tenant_code.clone(),
            tenant_name: tenant.tenant_name.clone(),
        })
    }

    /// Exchanges a still-valid token for a fresh one.
    pub fn refresh(&self, token: &str) -> Result<String, ApiAuthError> {
        self.codec.refresh(token).map_err(|e| {
            tracing::warn!(reason = %e, "token refresh rejected");
            ApiAuthError::TokenInvalid
        })
    }

    /// Loads the authenticated user's profile from the tenant schema.
    pub async fn current_user(&self, subject: &UserId) -> Result<UserView, ApiAuthError> {
        let mut conn = self.pool.conn().await?;
        let user = User::find_by_id(&mut conn, subject)
            .await?
            .ok_or_else(|| ApiAuthError::Internal(format!("user {subject} missing")))?;
        Ok(UserView::from(user))
    }

    /// Applies a self-service profile update.
    pub async fn update_profile(
        &self,
        ctx: &AuthContext,
        request: &UpdateProfileRequest,
    ) -> Result<UserView, ApiAuthError> {
        let mut conn = self.pool.conn().await?;
        let user = User::update_profile(
            &mut conn,
            &ctx.subject,
            request.email.as_deref(),
            request.phone.as_deref(),
            request.real_name.as_deref(),
        )
        .await?;
        Ok(UserView::from(user))
    }
}
