//! Tenant service: registration and administration.

use crate::error::TenantApiError;
use crate::models::{RegisterTenantRequest, TenantView};
use chrono::Utc;
use tombola_auth::hash_password;
use tombola_core::{Role, TenantId, TenantStatus, UserId};
use tombola_db::models::{NewUser, Tenant, User};
use tombola_db::{
    fallback_schema_name, is_valid_schema_name, provision_tenant_schema, DbError, TenantPool,
};

/// Default quotas for a newly registered tenant.
const DEFAULT_MAX_USERS: i32 = 10;
const DEFAULT_MAX_ACTIVITIES: i32 = 100;
const DEFAULT_STORAGE_QUOTA_MB: i32 = 1024;

/// Orchestrates registry writes and tenant schema provisioning.
#[derive(Clone)]
pub struct TenantService {
    pool: TenantPool,
}

impl TenantService {
    /// Creates the service over the routed pool.
    #[must_use]
    pub fn new(pool: TenantPool) -> Self {
        Self { pool }
    }

    /// Registers a new tenant: registry row, physical schema, and admin
    /// user, all in one transaction.
    ///
    /// The assigned schema name follows the same deterministic convention
    /// the statement router falls back to, so a registry row and a fallback
    /// resolution can never disagree about where a tenant's data lives.
    pub async fn register(
        &self,
        request: &RegisterTenantRequest,
    ) -> Result<TenantView, TenantApiError> {
        if Tenant::code_exists(self.pool.registry(), &request.tenant_code).await? {
            return Err(TenantApiError::CodeTaken);
        }

        let tenant_id = TenantId::generate();
        let admin_user_id = UserId::generate();
        let schema_name = fallback_schema_name(&tenant_id);
        debug_assert!(is_valid_schema_name(&schema_name));

        let now = Utc::now();
        let tenant = Tenant {
            tenant_id: tenant_id.clone(),
            tenant_code: request.tenant_code.clone(),
            tenant_name: request.tenant_name.clone(),
            schema_name: schema_name.clone(),
            admin_user_id: admin_user_id.clone(),
            status: TenantStatus::Active,
            max_users: DEFAULT_MAX_USERS,
            max_activities: DEFAULT_MAX_ACTIVITIES,
            storage_quota_mb: DEFAULT_STORAGE_QUOTA_MB,
            created_at: now,
            updated_at: now,
        };

        let password_hash = hash_password(&request.admin_password)
            .map_err(|e| TenantApiError::Internal(e.to_string()))?;

        let mut tx = self
            .pool
            .registry()
            .begin()
            .await
            .map_err(DbError::ConnectionFailed)?;

        Tenant::insert_in_tx(&mut tx, &tenant).await?;
        provision_tenant_schema(&mut tx, &schema_name).await?;

        // The admin user lives in the schema created two statements ago;
        // SET LOCAL scopes the search path to this transaction.
        sqlx::query(&format!(
            r#"SET LOCAL search_path TO "{schema_name}", public"#
        ))
        .execute(&mut *tx)
        .await
        .map_err(DbError::QueryFailed)?;

        let admin = NewUser {
            user_id: admin_user_id,
            username: request.admin_username.clone(),
            password_hash,
            email: request.admin_email.clone(),
            phone: request.admin_phone.clone(),
            real_name: request.admin_real_name.clone(),
            role: Role::Admin,
            created_by: None,
        };
        User::insert(&mut tx, &admin).await?;

        tx.commit().await.map_err(DbError::QueryFailed)?;

        // Warm the resolver so the first statement of the first login does
        // not pay a registry round-trip.
        self.pool
            .resolver()
            .cache()
            .put(tenant_id.clone(), schema_name.clone());

        tracing::info!(
            tenant_id = %tenant_id,
            tenant_code = %request.tenant_code,
            schema = %schema_name,
            "tenant registered"
        );

        Ok(TenantView::from(tenant))
    }

    /// The authenticated tenant's own record.
    pub async fn info(&self, tenant_id: &TenantId) -> Result<TenantView, TenantApiError> {
        Tenant::find_by_id(self.pool.registry(), tenant_id)
            .await?
            .map(TenantView::from)
            .ok_or(TenantApiError::NotFound)
    }

    /// All tenants, oldest first.
    pub async fn list(&self) -> Result<Vec<TenantView>, TenantApiError> {
        let tenants = Tenant::list_all(self.pool.registry()).await?;
        Ok(tenants.into_iter().map(TenantView::from).collect())
    }

    /// Flips a tenant's lifecycle status (soft-disable; never a delete).
    pub async fn update_status(
        &self,
        tenant_id: &TenantId,
        status: TenantStatus,
    ) -> Result<TenantView, TenantApiError> {
        let updated = Tenant::update_status(self.pool.registry(), tenant_id, status)
            .await
            .map_err(|e| match e {
                DbError::NotFound(_) => TenantApiError::NotFound,
                other => TenantApiError::Database(other),
            })?;
        tracing::info!(tenant_id = %tenant_id, status = %status, "tenant status updated");
        Ok(TenantView::from(updated))
    }

    /// Adjusts a tenant's quotas.
    pub async fn update_quotas(
        &self,
        tenant_id: &TenantId,
        max_users: i32,
        max_activities: i32,
        storage_quota_mb: i32,
    ) -> Result<TenantView, TenantApiError> {
        let updated = Tenant::update_quotas(
            self.pool.registry(),
            tenant_id,
            max_users,
            max_activities,
            storage_quota_mb,
        )
        .await
        .map_err(|e| match e {
            DbError::NotFound(_) => TenantApiError::NotFound,
            other => TenantApiError::Database(other),
        })?;
        Ok(TenantView::from(updated))
    }
}
