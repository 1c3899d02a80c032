//! # tombola-db
//!
//! Schema-routed database access for the multi-tenant tombola platform.
//!
//! One Postgres instance holds one schema per tenant plus the shared
//! `public` schema, which contains only the tenant registry. Business code
//! never names a schema: it acquires connections through [`TenantPool`],
//! which reads the active tenant from the request context
//! (`tombola_tenant::current_tenant`), resolves it to a physical schema name
//! (cache → registry → deterministic fallback), and applies the connection's
//! `search_path` before handing the connection out.
//!
//! The search path is applied on every acquisition, never trusted from a
//! prior checkout: pooled connections are reused across tenants between
//! statements, so connection-level session state is treated as dirty by
//! default.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tombola_db::{models::LotteryActivity, TenantPool};
//!
//! // Inside a request handled behind the authentication gate:
//! let mut conn = tenant_pool.conn().await?;
//! let activities = LotteryActivity::list(&mut conn).await?;
//! ```

mod cache;
mod error;
pub mod models;
mod pool;
mod provision;
mod resolver;
mod schema;

pub use cache::SchemaCache;
pub use error::DbError;
pub use pool::{connect_pool, TenantPool};
pub use provision::{ensure_registry, provision_tenant_schema};
pub use resolver::SchemaResolver;
pub use schema::{fallback_schema_name, is_valid_schema_name, search_path_statement};
