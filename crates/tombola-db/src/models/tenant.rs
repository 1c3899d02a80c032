//! The tenant registry record.
//!
//! Lives in the global `public` schema. Every query here names the table
//! `public.tenants` explicitly so the lookup works identically no matter
//! what search path the connection happens to carry — the registry is the
//! one table that must be reachable while resolving which schema everything
//! else belongs to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tombola_core::{TenantId, TenantStatus, UserId};

use crate::DbError;

/// A tenant in the registry.
///
/// `schema_name` is immutable once assigned: changing it would orphan the
/// tenant's data. Tenants are never physically deleted — status flips to
/// `SUSPENDED` instead.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique identifier for the tenant.
    pub tenant_id: TenantId,

    /// Human-facing unique code used at login (e.g. "acme").
    pub tenant_code: String,

    /// Display name of the tenant organization.
    pub tenant_name: String,

    /// Name of the Postgres schema holding this tenant's tables.
    pub schema_name: String,

    /// The tenant's administrator account (lives in the tenant schema).
    pub admin_user_id: UserId,

    /// Lifecycle status.
    pub status: TenantStatus,

    /// Quota: maximum user accounts.
    pub max_users: i32,

    /// Quota: maximum lottery activities.
    pub max_activities: i32,

    /// Quota: storage in megabytes.
    pub storage_quota_mb: i32,

    /// Timestamp when the tenant was registered.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last administrative update.
    pub updated_at: DateTime<Utc>,
}

const TENANT_COLUMNS: &str = "tenant_id, tenant_code, tenant_name, schema_name, admin_user_id, \
     status, max_users, max_activities, storage_quota_mb, created_at, updated_at";

impl Tenant {
    /// Finds a tenant by its ID.
    pub async fn find_by_id(pool: &PgPool, id: &TenantId) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {TENANT_COLUMNS} FROM public.tenants WHERE tenant_id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Finds a tenant by its login code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {TENANT_COLUMNS} FROM public.tenants WHERE tenant_code = $1"
        ))
        .bind(code)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Whether a tenant code is already taken.
    pub async fn code_exists(pool: &PgPool, code: &str) -> Result<bool, DbError> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM public.tenants WHERE tenant_code = $1)")
                .bind(code)
                .fetch_one(pool)
                .await
                .map_err(DbError::QueryFailed)?;
        Ok(row.0)
    }

    /// Lists all tenants, oldest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {TENANT_COLUMNS} FROM public.tenants ORDER BY created_at ASC"
        ))
        .fetch_all(pool)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Inserts a new registry row within a transaction.
    ///
    /// Registration creates the registry row, the tenant schema, and the
    /// admin user as one unit; the caller owns the transaction.
    pub async fn insert_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant: &Tenant,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO public.tenants \
             (tenant_id, tenant_code, tenant_name, schema_name, admin_user_id, status, \
              max_users, max_activities, storage_quota_mb, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&tenant.tenant_id)
        .bind(&tenant.tenant_code)
        .bind(&tenant.tenant_name)
        .bind(&tenant.schema_name)
        .bind(&tenant.admin_user_id)
        .bind(tenant.status)
        .bind(tenant.max_users)
        .bind(tenant.max_activities)
        .bind(tenant.storage_quota_mb)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(DbError::QueryFailed)?;
        Ok(())
    }

    /// Updates the lifecycle status, returning the updated row.
    pub async fn update_status(
        pool: &PgPool,
        id: &TenantId,
        status: TenantStatus,
    ) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE public.tenants SET status = $2, updated_at = NOW() \
             WHERE tenant_id = $1 RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)?
        .ok_or_else(|| DbError::NotFound(format!("tenant {id}")))
    }

    /// Updates the quota columns, returning the updated row.
    pub async fn update_quotas(
        pool: &PgPool,
        id: &TenantId,
        max_users: i32,
        max_activities: i32,
        storage_quota_mb: i32,
    ) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE public.tenants \
             SET max_users = $2, max_activities = $3, storage_quota_mb = $4, updated_at = NOW() \
             WHERE tenant_id = $1 RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id)
        .bind(max_users)
        .bind(max_activities)
        .bind(storage_quota_mb)
        .fetch_optional(pool)
        .await
        .map_err(DbError::QueryFailed)?
        .ok_or_else(|| DbError::NotFound(format!("tenant {id}")))
    }

    /// Whether the tenant may authenticate and operate.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tenant {
        Tenant {
            tenant_id: "t1".parse().unwrap(),
            tenant_code: "acme".to_string(),
            tenant_name: "Acme Corp".to_string(),
            schema_name: "tenant_abc".to_string(),
            admin_user_id: "u1".parse().unwrap(),
            status: TenantStatus::Active,
            max_users: 10,
            max_activities: 100,
            storage_quota_mb: 1024,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_active() {
        let mut tenant = sample();
        assert!(tenant.is_active());
        tenant.status = TenantStatus::Suspended;
        assert!(!tenant.is_active());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let tenant = sample();
        let json = serde_json::to_string(&tenant).unwrap();
        let back: Tenant = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tenant_code, "acme");
        assert_eq!(back.schema_name, "tenant_abc");
    }
}
