//! User accounts, stored once per tenant schema.
//!
//! All queries address the `users` table unqualified: the statement router
//! has already pointed the connection's search path at the right schema by
//! the time these run. Methods therefore take the routed connection, not
//! the pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use tombola_core::{Role, UserId, UserStatus};

use crate::DbError;

/// A user account within a tenant.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    /// Argon2id PHC hash; never serialized to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
    pub role: Role,
    pub created_by: Option<UserId>,
}

const USER_COLUMNS: &str = "user_id, username, password_hash, email, phone, real_name, role, \
     status, last_login_at, created_at, updated_at, created_by";

impl User {
    /// Finds a user by ID in the active tenant's schema.
    pub async fn find_by_id(conn: &mut PgConnection, id: &UserId) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Finds a user by login name in the active tenant's schema.
    pub async fn find_by_username(
        conn: &mut PgConnection,
        username: &str,
    ) -> Result<Option<Self>, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Inserts a user, returning the stored row.
    pub async fn insert(conn: &mut PgConnection, new: &NewUser) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO users \
             (user_id, username, password_hash, email, phone, real_name, role, status, \
              created_at, updated_at, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'ACTIVE', NOW(), NOW(), $8) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new.user_id)
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.real_name)
        .bind(new.role)
        .bind(&new.created_by)
        .fetch_one(conn)
        .await
        .map_err(DbError::QueryFailed)
    }

    /// Stamps the last successful login.
    pub async fn touch_last_login(conn: &mut PgConnection, id: &UserId) -> Result<(), DbError> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE user_id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(DbError::QueryFailed)?;
        Ok(())
    }

    /// Updates the profile fields a user may edit themselves.
    pub async fn update_profile(
        conn: &mut PgConnection,
        id: &UserId,
        email: Option<&str>,
        phone: Option<&str>,
        real_name: Option<&str>,
    ) -> Result<Self, DbError> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE users SET \
             email = COALESCE($2, email), \
             phone = COALESCE($3, phone), \
             real_name = COALESCE($4, real_name), \
             updated_at = NOW() \
             WHERE user_id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(email)
        .bind(phone)
        .bind(real_name)
        .fetch_optional(conn)
        .await
        .map_err(DbError::QueryFailed)?
        .ok_or_else(|| DbError::NotFound(format!("user {id}")))
    }

    /// Whether the account may log in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            user_id: "u1".parse().unwrap(),
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
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
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice"));
    }

    #[test]
    fn test_is_active() {
        let mut user = User {
            user_id: "u1".parse().unwrap(),
            username: "alice".to_string(),
            password_hash: String::new(),
            email: None,
            phone: None,
            real_name: None,
            role: Role::Viewer,
            status: UserStatus::Active,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: None,
        };
        assert!(user.is_active());
        user.status = UserStatus::Disabled;
        assert!(!user.is_active());
    }
}
