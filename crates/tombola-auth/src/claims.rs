//! Token claims: RFC 7519 standard claims plus the tenant/role claims
//! that drive schema routing and authorization.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tombola_core::{Role, TenantId, UserId};
use uuid::Uuid;

/// Claims carried by an identity token.
///
/// # Standard Claims (RFC 7519)
///
/// - `sub`: subject (user ID)
/// - `exp`: expiration time (Unix timestamp)
/// - `iat`: issued at (Unix timestamp)
/// - `jti`: unique token identifier
///
/// # Custom Claims
///
/// - `tid`: tenant ID — drives schema routing for every statement the
///   request issues
/// - `username`: login name, echoed back in profile responses
/// - `role`: authorization role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the user ID.
    pub sub: String,

    /// Tenant ID for multi-tenant isolation.
    pub tid: String,

    /// Login name of the subject.
    pub username: String,

    /// Authorization role.
    pub role: Role,

    /// Issued at, as a Unix timestamp.
    pub iat: i64,

    /// Expiration time, as a Unix timestamp.
    pub exp: i64,

    /// Unique token identifier.
    pub jti: String,
}

impl Claims {
    /// Assembles a fresh set of claims expiring `ttl_secs` from now.
    #[must_use]
    pub fn new(
        subject: &UserId,
        tenant_id: &TenantId,
        username: &str,
        role: Role,
        ttl_secs: i64,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            tid: tenant_id.to_string(),
            username: username.to_string(),
            role,
            iat: now,
            exp: now + ttl_secs,
            jti: Uuid::new_v4().simple().to_string(),
        }
    }

    /// The tenant ID as a typed identifier.
    ///
    /// Returns `None` only if the claim text fails identifier validation,
    /// which a token issued by [`crate::TokenCodec`] never does.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tid.parse().ok()
    }

    /// The subject as a typed user identifier.
    #[must_use]
    pub fn subject_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }

    /// Whether the expiration instant has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
