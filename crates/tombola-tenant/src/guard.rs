//! Authorization guards for routes that demand an authenticated caller.
//!
//! The gate never rejects a request; these `from_fn` middlewares do, after
//! the fact, on routes where anonymous access is not acceptable.

use crate::error::GateError;
use crate::extract::AuthContext;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tombola_core::Role;

/// Rejects requests with no authenticated identity (401).
pub async fn require_auth(request: Request, next: Next) -> Result<Response, Response> {
    if request.extensions().get::<AuthContext>().is_none() {
        return Err(GateError::Unauthorized.into_response());
    }
    Ok(next.run(request).await)
}

/// Rejects unauthenticated requests (401) and authenticated requests whose
/// role does not satisfy `required` (403).
pub async fn require_role(
    required: Role,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(ctx) = request.extensions().get::<AuthContext>() else {
        return Err(GateError::Unauthorized.into_response());
    };

    if !ctx.has_role(required) {
        tracing::warn!(
            subject = %ctx.subject,
            tenant_id = %ctx.tenant_id,
            role = %ctx.role,
            required = %required,
            "request rejected by role guard"
        );
        return Err(GateError::Forbidden(required.as_str()).into_response());
    }

    Ok(next.run(request).await)
}

/// Shorthand for `require_role(Role::Admin, ...)`, the common case.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, Response> {
    require_role(Role::Admin, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn ok_handler() -> &'static str {
        "ok"
    }

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            subject: "u1".parse().unwrap(),
            tenant_id: "t1".parse().unwrap(),
            username: "alice".to_string(),
            role,
        }
    }

    fn app_with_admin_guard() -> Router {
        Router::new()
            .route("/guarded", get(ok_handler))
            .layer(middleware::from_fn(require_admin))
    }

    fn request_with(ctx: Option<AuthContext>) -> axum::http::Request<Body> {
        let mut req = axum::http::Request::builder()
            .uri("/guarded")
            .body(Body::empty())
            .unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req
    }

    #[tokio::test]
    async fn test_anonymous_rejected_401() {
        let response = app_with_admin_guard()
            .oneshot(request_with(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_viewer_rejected_403() {
        let response = app_with_admin_guard()
            .oneshot(request_with(Some(ctx(Role::Viewer))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_allowed() {
        let response = app_with_admin_guard()
            .oneshot(request_with(Some(ctx(Role::Admin))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_super_admin_satisfies_admin_guard() {
        let response = app_with_admin_guard()
            .oneshot(request_with(Some(ctx(Role::SuperAdmin))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_require_auth_allows_any_authenticated_role() {
        let app = Router::new()
            .route("/guarded", get(ok_handler))
            .layer(middleware::from_fn(require_auth));
        let response = app
            .oneshot(request_with(Some(ctx(Role::Viewer))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
