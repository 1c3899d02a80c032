//! # tombola-api-auth
//!
//! Authentication endpoints: login, token refresh, logout, and the current
//! user's profile.
//!
//! Login is the one flow that binds a tenant context *itself*: the caller is
//! not authenticated yet, so the service resolves the tenant by its login
//! code from the registry, binds it, and only then looks the user up in the
//! tenant's schema — the same statement-routing path every authenticated
//! request takes.

mod error;
pub mod handlers;
mod models;
mod router;
mod services;

pub use error::ApiAuthError;
pub use models::{
    LoginRequest, LoginResponse, RefreshResponse, UpdateProfileRequest, UserView,
};
pub use router::{auth_router, AuthApiState};
pub use services::AuthService;
