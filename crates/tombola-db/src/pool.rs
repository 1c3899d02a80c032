//! The statement router: schema-routed connection acquisition.

use crate::cache::SchemaCache;
use crate::error::DbError;
use crate::resolver::SchemaResolver;
use crate::schema::{is_valid_schema_name, search_path_statement};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::time::Duration;
use tombola_tenant::current_tenant;

/// Connects a bounded Postgres pool with an acquire timeout.
///
/// # Errors
///
/// Returns `DbError::ConnectionFailed` when the server is unreachable or
/// refuses the credentials.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, DbError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(DbError::ConnectionFailed)
}

/// Schema-routing wrapper around the shared connection pool.
///
/// Every connection checkout passes through one seam:
///
/// - **no tenant bound** — the connection is handed out untouched and the
///   statement runs against the default/global schema (registry and system
///   queries address their tables schema-qualified, so a stale search path
///   from a prior checkout cannot reroute them);
/// - **tenant bound, resolvable** — the search order becomes
///   `[tenant schema, public]` on the very connection the statement will run
///   on;
/// - **tenant bound, unresolvable** — the deterministic fallback name is
///   applied (logged by the resolver), execution proceeds.
///
/// Because the path is re-applied at every tenant-bound checkout — never
/// trusted from a prior one — and connections return to the pool only when
/// the checkout drops, no ordering exists in which a tenant's statement runs
/// under another tenant's search path.
#[derive(Debug, Clone)]
pub struct TenantPool {
    pool: PgPool,
    resolver: SchemaResolver,
}

impl TenantPool {
    /// Wraps a pool with a fresh schema cache.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_cache(pool, SchemaCache::new())
    }

    /// Wraps a pool sharing an existing schema cache.
    #[must_use]
    pub fn with_cache(pool: PgPool, cache: SchemaCache) -> Self {
        let resolver = SchemaResolver::with_cache(pool.clone(), cache);
        Self { pool, resolver }
    }

    /// The raw, un-routed pool.
    ///
    /// Registry operations use this directly: they address
    /// `public.tenants` with a schema-qualified name and must work no matter
    /// which tenant is active.
    #[must_use]
    pub fn registry(&self) -> &PgPool {
        &self.pool
    }

    /// The schema resolver (exposed for cache warm-up after provisioning).
    #[must_use]
    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// The schema the active context would route to, if a tenant is bound.
    ///
    /// # Errors
    ///
    /// Propagates registry lookup failures.
    pub async fn active_schema(&self) -> Result<Option<String>, DbError> {
        match current_tenant() {
            Some(tenant_id) => Ok(Some(self.resolver.resolve(&tenant_id).await?)),
            None => Ok(None),
        }
    }

    /// Acquires a connection routed for the active tenant context.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionFailed` when the pool cannot produce a
    /// connection, plus any resolution or search-path failure.
    pub async fn conn(&self) -> Result<PoolConnection<Postgres>, DbError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(DbError::ConnectionFailed)?;
        self.route(&mut conn).await?;
        Ok(conn)
    }

    /// Begins a transaction routed for the active tenant context.
    ///
    /// The schema switch runs inside the transaction, on the same
    /// connection every statement of the transaction will use.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionFailed`/`QueryFailed` as for [`conn`].
    ///
    /// [`conn`]: TenantPool::conn
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        let mut tx = self.pool.begin().await.map_err(DbError::ConnectionFailed)?;
        self.route(&mut tx).await?;
        Ok(tx)
    }

    /// Applies the search path for the active context on `conn`.
    async fn route(&self, conn: &mut PgConnection) -> Result<(), DbError> {
        match current_tenant() {
            Some(tenant_id) => {
                let schema = self.resolver.resolve(&tenant_id).await?;
                if !is_valid_schema_name(&schema) {
                    return Err(DbError::InvalidSchemaName(schema));
                }
                sqlx::query(&search_path_statement(&schema))
                    .execute(&mut *conn)
                    .await
                    .map_err(DbError::QueryFailed)?;
                tracing::debug!(tenant_id = %tenant_id, schema = %schema, "search path routed");
            }
            None => {
                // Anonymous context: no switch statement at all. Global
                // operations name their tables schema-qualified.
                tracing::trace!("no tenant bound, connection unrouted");
            }
        }
        Ok(())
    }
}
