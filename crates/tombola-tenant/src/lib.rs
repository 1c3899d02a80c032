//! # tombola-tenant
//!
//! Request-scoped tenant context and the authentication gate middleware.
//!
//! Every inbound request passes through [`AuthGateLayer`] exactly once. The
//! gate extracts the bearer credential, verifies it with the token codec, and
//! runs the rest of the request inside a per-task tenant slot. Downstream
//! code — most importantly the statement router in `tombola-db` — reads the
//! active tenant with [`current_tenant`] without any parameter threading.
//!
//! The slot's lifetime is the request future's lifetime: it is created empty
//! when the gate starts the request and destroyed when the request future
//! completes or is dropped (client disconnect, timeout). A pooled worker can
//! therefore never observe a previous request's binding.
//!
//! An invalid or absent credential is not an error here: the request simply
//! proceeds anonymously and the authorization guards ([`require_auth`],
//! [`require_role`]) reject where a route demands authentication.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use axum::{middleware, routing::get, Router};
//! use tombola_auth::TokenCodec;
//! use tombola_tenant::{require_auth, AuthContext, AuthGateLayer};
//!
//! async fn whoami(ctx: AuthContext) -> String {
//!     format!("{} @ {}", ctx.username, ctx.tenant_id)
//! }
//!
//! let codec = Arc::new(TokenCodec::new(b"secret", 3600));
//! let app: Router = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(middleware::from_fn(require_auth))
//!     .layer(AuthGateLayer::new(codec));
//! ```

mod context;
mod error;
mod extract;
mod gate;
mod guard;

pub use context::{bind_tenant, clear_tenant, current_tenant, tenant_scope};
pub use error::{ErrorResponse, GateError};
pub use extract::AuthContext;
pub use gate::{AuthGateFuture, AuthGateLayer, AuthGateService};
pub use guard::{require_admin, require_auth, require_role};
