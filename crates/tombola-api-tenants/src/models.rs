//! Request and response bodies for the tenant API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tombola_core::{TenantId, TenantStatus};
use tombola_db::models::Tenant;
use utoipa::ToSchema;
use validator::Validate;

/// Tenant self-registration request.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterTenantRequest {
    /// Login code, unique across the platform.
    #[validate(length(min = 2, max = 64, message = "tenant code must be 2-64 characters"))]
    pub tenant_code: String,

    #[validate(length(min = 1, max = 255, message = "tenant name is required"))]
    pub tenant_name: String,

    #[validate(length(min = 1, max = 64, message = "admin username is required"))]
    pub admin_username: String,

    #[validate(length(min = 8, max = 128, message = "admin password must be at least 8 characters"))]
    pub admin_password: String,

    #[validate(email(message = "invalid email address"))]
    pub admin_email: Option<String>,

    #[validate(length(max = 32, message = "phone number too long"))]
    pub admin_phone: Option<String>,

    #[validate(length(max = 128, message = "name too long"))]
    pub admin_real_name: Option<String>,
}

/// A tenant, as exposed to clients.
///
/// The physical schema name is an internal routing detail and is not
/// included.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TenantView {
    pub tenant_id: TenantId,
    pub tenant_code: String,
    pub tenant_name: String,
    pub status: TenantStatus,
    pub max_users: i32,
    pub max_activities: i32,
    pub storage_quota_mb: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tenant> for TenantView {
    fn from(tenant: Tenant) -> Self {
        Self {
            tenant_id: tenant.tenant_id,
            tenant_code: tenant.tenant_code,
            tenant_name: tenant.tenant_name,
            status: tenant.status,
            max_users: tenant.max_users,
            max_activities: tenant.max_activities,
            storage_quota_mb: tenant.storage_quota_mb,
            created_at: tenant.created_at,
            updated_at: tenant.updated_at,
        }
    }
}

/// Administrative status change.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: TenantStatus,
}

/// Administrative quota change.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateQuotasRequest {
    #[validate(range(min = 1, max = 100_000, message = "max_users out of range"))]
    pub max_users: i32,

    #[validate(range(min = 1, max = 100_000, message = "max_activities out of range"))]
    pub max_activities: i32,

    #[validate(range(min = 1, max = 1_048_576, message = "storage_quota_mb out of range"))]
    pub storage_quota_mb: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterTenantRequest {
        RegisterTenantRequest {
            tenant_code: "acme".into(),
            tenant_name: "Acme Corp".into(),
            admin_username: "admin".into(),
            admin_password: "hunter2hunter2".into(),
            admin_email: None,
            admin_phone: None,
            admin_real_name: None,
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register_request().validate().is_ok());

        let mut short_password = register_request();
        short_password.admin_password = "short".into();
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_tenant_view_hides_schema_name() {
        let tenant = Tenant {
            tenant_id: "t1".parse().unwrap(),
            tenant_code: "acme".into(),
            tenant_name: "Acme Corp".into(),
            schema_name: "tenant_secret".into(),
            admin_user_id: "u1".parse().unwrap(),
            status: TenantStatus::Active,
            max_users: 10,
            max_activities: 100,
            storage_quota_mb: 1024,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&TenantView::from(tenant)).unwrap();
        assert!(!json.contains("tenant_secret"));
        assert!(json.contains("acme"));
    }

    #[test]
    fn test_quota_ranges() {
        let ok = UpdateQuotasRequest {
            max_users: 50,
            max_activities: 500,
            storage_quota_mb: 2048,
        };
        assert!(ok.validate().is_ok());

        let zero_users = UpdateQuotasRequest {
            max_users: 0,
            max_activities: 500,
            storage_quota_mb: 2048,
        };
        assert!(zero_users.validate().is_err());
    }
}
