//! tombola API server
//!
//! Multi-tenant lottery backend. Each tenant's data lives in its own
//! Postgres schema; the authentication gate binds the request's tenant
//! context and the statement router points every query at the right schema.

mod config;
mod logging;
mod openapi;

use axum::{http::StatusCode, routing::get, Json, Router};
use config::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tombola_api_auth::auth_router;
use tombola_api_lottery::lottery_router;
use tombola_api_tenants::tenant_router;
use tombola_auth::TokenCodec;
use tombola_db::{connect_pool, ensure_registry, TenantPool};
use tombola_tenant::AuthGateLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        "Starting tombola API"
    );

    let pool = match connect_pool(&config.database_url, config.db_max_connections).await {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = ensure_registry(&pool).await {
        eprintln!("Failed to prepare tenant registry: {e}");
        std::process::exit(1);
    }

    let tenant_pool = TenantPool::new(pool);
    let codec = Arc::new(TokenCodec::new(
        config.jwt_secret.as_bytes(),
        config.jwt_ttl_secs,
    ));

    let app = build_app(tenant_pool, codec, &config.cors_origins);

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Assembles the full application router.
///
/// The authentication gate is the outermost layer: it runs once per
/// request, before any route's guard, and owns the tenant context's
/// lifecycle for the whole request.
fn build_app(pool: TenantPool, codec: Arc<TokenCodec>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(openapi::docs_routes())
        .nest("/api/auth", auth_router(pool.clone(), codec.clone()))
        .nest("/api/tenant", tenant_router(pool.clone()))
        .nest("/api/lottery", lottery_router(pool))
        .layer(AuthGateLayer::new(codec))
        .layer(build_cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Liveness endpoint.
async fn health_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")})),
    )
}

/// CORS from configured origins; wildcard means a fully open policy
/// (development), explicit origins enable credentials.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let is_wildcard = origins.len() == 1 && origins[0] == "*";

    if is_wildcard {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(Duration::from_secs(3600))
    } else {
        use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
        use axum::http::Method;

        let allowed: Vec<axum::http::HeaderValue> =
            origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, ORIGIN])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    }
}

/// Graceful shutdown on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    /// A lazily-constructed pool pointing nowhere; routes that do not touch
    /// the database work fine over it.
    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://nobody@127.0.0.1:1/nothing")
            .expect("lazy pool construction is infallible");
        let codec = Arc::new(TokenCodec::new(b"test-secret-for-the-binary", 3600));
        build_app(TenantPool::new(pool), codec, &["*".to_string()])
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_guarded_route_rejects_anonymous() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/lottery/activities")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_guarded_route_rejects_garbage_token() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/me")
                    .header("Authorization", "Bearer not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        // The gate degrades to anonymous; the guard rejects.
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_openapi_document_builds() {
        use utoipa::OpenApi;
        let doc = openapi::ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/auth/login"));
        assert!(doc.paths.paths.contains_key("/api/tenant/register"));
    }
}
