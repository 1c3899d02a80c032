//! # tombola-api-tenants
//!
//! Tenant registration and administration.
//!
//! Registration is the one place a schema name is *assigned*: the registry
//! row, the tenant schema with its tables, and the tenant's admin user are
//! created in a single transaction. Once assigned, a schema name never
//! changes — the rest of the platform only ever resolves it.

mod error;
pub mod handlers;
mod models;
mod router;
mod services;

pub use error::TenantApiError;
pub use models::{
    RegisterTenantRequest, TenantView, UpdateQuotasRequest, UpdateStatusRequest,
};
pub use router::{tenant_router, TenantApiState};
pub use services::TenantService;
