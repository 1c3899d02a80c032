//! Credential extraction and the authenticated request context.

use http::Request;
use tombola_auth::TokenCodec;
use tombola_core::{Role, TenantId, UserId};

/// The authenticated identity of a request.
///
/// Inserted into request extensions by the authentication gate when a valid
/// token is presented. Handlers access it via `Extension<AuthContext>` or the
/// [`axum::extract::FromRequestParts`] impl below.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The authenticated user.
    pub subject: UserId,
    /// The tenant the token was issued for.
    pub tenant_id: TenantId,
    /// Login name of the subject.
    pub username: String,
    /// Authorization role.
    pub role: Role,
}

impl AuthContext {
    /// Whether this identity satisfies `required` (honoring the role
    /// hierarchy).
    #[must_use]
    pub fn has_role(&self, required: Role) -> bool {
        self.role.satisfies(required)
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = crate::error::GateError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(crate::error::GateError::Unauthorized)
    }
}

/// Pulls the bearer token out of the `Authorization` header.
///
/// Absence, a malformed prefix, and an empty token all mean the same thing
/// to the caller: no credential.
pub(crate) fn extract_bearer<B>(req: &Request<B>) -> Option<&str> {
    let value = req.headers().get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Verifies the request's bearer credential, if any.
///
/// Returns `None` for absent, malformed, forged, or expired credentials —
/// the request then proceeds anonymously and downstream authorization
/// decides whether that is acceptable. Failure reasons are logged for
/// observability but never surfaced to the client.
pub(crate) fn authenticate<B>(req: &Request<B>, codec: &TokenCodec) -> Option<AuthContext> {
    let token = match extract_bearer(req) {
        Some(token) => token,
        None => {
            tracing::trace!("no bearer credential on request");
            return None;
        }
    };

    let claims = match codec.verify(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(reason = %err, "bearer token rejected");
            return None;
        }
    };

    let (Some(subject), Some(tenant_id)) = (claims.subject_id(), claims.tenant_id()) else {
        tracing::warn!("token claims carry unusable identifiers");
        return None;
    };

    Some(AuthContext {
        subject,
        tenant_id,
        username: claims.username,
        role: claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"gate-test-secret", 3600)
    }

    fn request_with_auth(value: &str) -> Request<()> {
        Request::builder()
            .header("Authorization", value)
            .body(())
            .unwrap()
    }

    #[test]
    fn test_extract_bearer_valid() {
        let req = request_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&req), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_missing_header() {
        let req = Request::builder().body(()).unwrap();
        assert_eq!(extract_bearer(&req), None);
    }

    #[test]
    fn test_extract_bearer_wrong_prefix() {
        let req = request_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer(&req), None);
    }

    #[test]
    fn test_extract_bearer_empty_token() {
        let req = request_with_auth("Bearer ");
        assert_eq!(extract_bearer(&req), None);
    }

    #[test]
    fn test_authenticate_valid_token() {
        let codec = codec();
        let token = codec
            .issue(
                &"u1".parse().unwrap(),
                &"t1".parse().unwrap(),
                "alice",
                Role::Admin,
            )
            .unwrap();

        let req = request_with_auth(&format!("Bearer {token}"));
        let ctx = authenticate(&req, &codec).unwrap();

        assert_eq!(ctx.subject.as_str(), "u1");
        assert_eq!(ctx.tenant_id.as_str(), "t1");
        assert_eq!(ctx.username, "alice");
        assert!(ctx.has_role(Role::Admin));
    }

    #[test]
    fn test_authenticate_forged_token() {
        let other = TokenCodec::new(b"different-secret", 3600);
        let token = other
            .issue(
                &"u1".parse().unwrap(),
                &"t1".parse().unwrap(),
                "alice",
                Role::Admin,
            )
            .unwrap();

        let req = request_with_auth(&format!("Bearer {token}"));
        assert!(authenticate(&req, &codec()).is_none());
    }

    #[test]
    fn test_authenticate_expired_token() {
        let expired = TokenCodec::new(b"gate-test-secret", -60);
        let token = expired
            .issue(
                &"u1".parse().unwrap(),
                &"t1".parse().unwrap(),
                "alice",
                Role::Viewer,
            )
            .unwrap();

        let req = request_with_auth(&format!("Bearer {token}"));
        assert!(authenticate(&req, &codec()).is_none());
    }

    #[test]
    fn test_authenticate_no_credential() {
        let req = Request::builder().body(()).unwrap();
        assert!(authenticate(&req, &codec()).is_none());
    }

    #[test]
    fn test_has_role_hierarchy() {
        let ctx = AuthContext {
            subject: "u1".parse().unwrap(),
            tenant_id: "t1".parse().unwrap(),
            username: "root".to_string(),
            role: Role::SuperAdmin,
        };
        assert!(ctx.has_role(Role::Admin));
        assert!(!ctx.has_role(Role::Viewer));
    }
}
