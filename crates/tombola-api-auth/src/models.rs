//! Request and response bodies for the authentication API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tombola_core::{Role, UserId, UserStatus};
use tombola_db::models::User;
use utoipa::ToSchema;
use validator::Validate;

/// Login request.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// The tenant's login code (e.g. "acme").
    #[validate(length(min = 1, max = 64, message = "tenant code is required"))]
    pub tenant_code: String,

    #[validate(length(min = 1, max = 64, message = "username is required"))]
    pub username: String,

    #[validate(length(min = 1, max = 128, message = "password is required"))]
    pub password: String,
}

/// A user, as exposed to clients (no password hash).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub user_id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            real_name: user.real_name,
            role: user.role,
            status: user.status,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    pub user: UserView,
    pub tenant_code: String,
    pub tenant_name: String,
}

/// Token refresh response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub token: String,
}

/// Self-service profile update.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,

    #[validate(length(max = 32, message = "phone number too long"))]
    pub phone: Option<String>,

    #[validate(length(max = 128, message = "name too long"))]
    pub real_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            tenant_code: "acme".into(),
            username: "alice".into(),
            password: "secret".into(),
        };
        assert!(ok.validate().is_ok());

        let missing_tenant = LoginRequest {
            tenant_code: String::new(),
            username: "alice".into(),
            password: "secret".into(),
        };
        assert!(missing_tenant.validate().is_err());
    }

    #[test]
    fn test_profile_update_rejects_bad_email() {
        let bad = UpdateProfileRequest {
            email: Some("not-an-email".into()),
            phone: None,
            real_name: None,
        };
        assert!(bad.validate().is_err());

        let ok = UpdateProfileRequest {
            email: Some("alice@example.com".into()),
            phone: None,
            real_name: None,
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_user_view_drops_password_hash() {
        let user = User {
            user_id: "u1".parse().unwrap(),
            username: "alice".into(),
            password_hash: "$argon2id$hash".into(),
            email: None,
            phone: None,
            real_name: None,
            role: Role::Admin,
            status: UserStatus::Active,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: None,
        };
        let view = UserView::from(user);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
