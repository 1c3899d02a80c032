//! The authentication gate: tower `Layer`/`Service` pair.
//!
//! Runs once per inbound request, before any handler code:
//!
//! 1. extracts and verifies the bearer credential;
//! 2. on success, inserts [`AuthContext`] into request extensions and binds
//!    the tenant slot; on failure, leaves the request anonymous;
//! 3. runs the inner service inside a fresh per-task tenant scope and clears
//!    the binding when the request completes.
//!
//! The scope is created empty for every request, so a non-empty context at
//! request start — the cross-request leakage defect — is impossible by
//! construction. Cancellation (the request future being dropped) destroys
//! the slot the same way completion does.

use crate::context::{clear_tenant, tenant_scope_with, TenantScopeFuture};
use crate::extract::{authenticate, AuthContext};
use http::{Request, Response};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tombola_auth::TokenCodec;
use tower_layer::Layer;
use tower_service::Service;

/// Tower layer installing the authentication gate.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tombola_auth::TokenCodec;
/// use tombola_tenant::AuthGateLayer;
///
/// let codec = Arc::new(TokenCodec::new(b"secret", 3600));
/// let app = Router::new()
///     .route("/api/activities", get(list_activities))
///     .layer(AuthGateLayer::new(codec));
/// ```
#[derive(Debug, Clone)]
pub struct AuthGateLayer {
    codec: Arc<TokenCodec>,
}

impl AuthGateLayer {
    /// Creates the layer around the shared token codec.
    #[must_use]
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S> Layer<S> for AuthGateLayer {
    type Service = AuthGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGateService {
            inner,
            codec: Arc::clone(&self.codec),
        }
    }
}

/// Service wrapper produced by [`AuthGateLayer`].
#[derive(Debug, Clone)]
pub struct AuthGateService<S> {
    inner: S,
    codec: Arc<TokenCodec>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthGateService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = AuthGateFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let auth = authenticate(&req, &self.codec);
        let tenant = auth.as_ref().map(|ctx| ctx.tenant_id.clone());

        if let Some(ctx) = auth {
            tracing::debug!(
                tenant_id = %ctx.tenant_id,
                subject = %ctx.subject,
                role = %ctx.role,
                "request authenticated"
            );
            req.extensions_mut().insert(ctx);
        }

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        // The tenant binding is observable while the inner future is polled,
        // i.e. for the whole of handler execution.
        AuthGateFuture {
            inner: tenant_scope_with(
                tenant,
                ClearOnDone {
                    inner: inner.call(req),
                },
            ),
        }
    }
}

pin_project! {
    /// Future for [`AuthGateService`]: the inner request future running
    /// inside its tenant scope.
    pub struct AuthGateFuture<F> {
        #[pin]
        inner: TenantScopeFuture<ClearOnDone<F>>,
    }
}

impl<F> Future for AuthGateFuture<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.project().inner.poll(cx)
    }
}

pin_project! {
    /// Clears the tenant binding as the wrapped future completes.
    ///
    /// Runs inside the tenant scope; the drop of the scope itself covers the
    /// cancellation path, this covers ordinary completion so the slot is
    /// observably empty by the time the response leaves the gate.
    pub struct ClearOnDone<F> {
        #[pin]
        inner: F,
    }
}

impl<F> Future for ClearOnDone<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project().inner.poll(cx) {
            Poll::Ready(output) => {
                clear_tenant();
                Poll::Ready(output)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::current_tenant;
    use axum::body::Body;
    use std::convert::Infallible;
    use tombola_core::Role;
    use tower::ServiceExt;

    /// Inner service that reports what it observed: the extension's tenant
    /// at call time and the slot's tenant at poll time.
    #[derive(Clone)]
    struct ProbeService;

    impl Service<Request<Body>> for ProbeService {
        type Response = Response<Body>;
        type Error = Infallible;
        type Future =
            Pin<Box<dyn Future<Output = Result<Response<Body>, Infallible>> + Send>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Body>) -> Self::Future {
            let ext_tenant = req
                .extensions()
                .get::<AuthContext>()
                .map(|ctx| ctx.tenant_id.to_string());
            Box::pin(async move {
                let slot_tenant = current_tenant().map(|t| t.to_string());
                let body = format!(
                    "ext={} slot={}",
                    ext_tenant.unwrap_or_else(|| "-".to_string()),
                    slot_tenant.unwrap_or_else(|| "-".to_string()),
                );
                Ok(Response::new(Body::from(body)))
            })
        }
    }

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(b"gate-test-secret", 3600))
    }

    fn gate() -> AuthGateService<ProbeService> {
        AuthGateLayer::new(codec()).layer(ProbeService)
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn issue(codec: &TokenCodec, tenant: &str) -> String {
        codec
            .issue(
                &"u1".parse().unwrap(),
                &tenant.parse().unwrap(),
                "alice",
                Role::Admin,
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_binds_context_and_slot() {
        let codec = codec();
        let token = issue(&codec, "t1");
        let req = Request::builder()
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = gate().oneshot(req).await.unwrap();
        assert_eq!(body_text(response).await, "ext=t1 slot=t1");
    }

    #[tokio::test]
    async fn test_anonymous_request_passes_through() {
        let req = Request::builder().body(Body::empty()).unwrap();

        let response = gate().oneshot(req).await.unwrap();
        assert_eq!(body_text(response).await, "ext=- slot=-");
    }

    #[tokio::test]
    async fn test_invalid_token_degrades_to_anonymous() {
        let req = Request::builder()
            .header("Authorization", "Bearer not-a-real-token")
            .body(Body::empty())
            .unwrap();

        let response = gate().oneshot(req).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_text(response).await, "ext=- slot=-");
    }

    #[tokio::test]
    async fn test_expired_token_degrades_to_anonymous() {
        let expired = TokenCodec::new(b"gate-test-secret", -60);
        let token = issue(&expired, "t1");
        let req = Request::builder()
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = gate().oneshot(req).await.unwrap();
        assert_eq!(body_text(response).await, "ext=- slot=-");
    }

    #[tokio::test]
    async fn test_slot_empty_after_request_completes() {
        let codec = codec();
        let token = issue(&codec, "t1");
        let req = Request::builder()
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let _ = gate().oneshot(req).await.unwrap();
        assert_eq!(current_tenant(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_see_their_own_tenant() {
        let codec = codec();
        let mut handles = Vec::new();
        for i in 0..12 {
            let token = issue(&codec, &format!("t{i}"));
            let service = gate();
            handles.push(tokio::spawn(async move {
                let req = Request::builder()
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap();
                let response = service.oneshot(req).await.unwrap();
                (i, body_text(response).await)
            }));
        }
        for handle in handles {
            let (i, body) = handle.await.unwrap();
            assert_eq!(body, format!("ext=t{i} slot=t{i}"));
        }
    }
}
