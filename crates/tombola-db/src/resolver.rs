//! Tenant-id → schema-name resolution.

use crate::cache::SchemaCache;
use crate::error::DbError;
use crate::models::Tenant;
use crate::schema::{fallback_schema_name, is_valid_schema_name};
use sqlx::PgPool;
use tombola_core::TenantId;

/// Resolves a tenant id to its physical schema name.
///
/// Resolution order: cache → tenant registry → deterministic fallback.
/// The registry query runs against the schema-qualified `public.tenants`
/// table on the raw pool, so it is exempt from tenant routing regardless of
/// the active context.
///
/// A missing registry entry degrades to the fallback naming convention with
/// a WARN — availability over strictness, a documented design risk: a stale
/// or mistyped tenant id will quietly address a schema that may never have
/// been provisioned. A registry *query failure*, in contrast, propagates as
/// the failure of the current statement.
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    pool: PgPool,
    cache: SchemaCache,
}

impl SchemaResolver {
    /// Creates a resolver over the registry pool with a fresh cache.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_cache(pool, SchemaCache::new())
    }

    /// Creates a resolver sharing an existing cache.
    #[must_use]
    pub fn with_cache(pool: PgPool, cache: SchemaCache) -> Self {
        Self { pool, cache }
    }

    /// The resolver's cache.
    #[must_use]
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Resolves the schema name for `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::QueryFailed`/`ConnectionFailed` when the registry
    /// lookup itself fails, and `DbError::InvalidSchemaName` when the
    /// registry holds a name that cannot be safely interpolated.
    pub async fn resolve(&self, tenant_id: &TenantId) -> Result<String, DbError> {
        if let Some(hit) = self.cache.get(tenant_id) {
            tracing::trace!(tenant_id = %tenant_id, schema = %hit, "schema cache hit");
            return Ok(hit);
        }

        match Tenant::find_by_id(&self.pool, tenant_id).await? {
            Some(tenant) => {
                if !is_valid_schema_name(&tenant.schema_name) {
                    return Err(DbError::InvalidSchemaName(tenant.schema_name));
                }
                self.cache
                    .put(tenant_id.clone(), tenant.schema_name.clone());
                tracing::debug!(
                    tenant_id = %tenant_id,
                    schema = %tenant.schema_name,
                    "schema resolved from registry"
                );
                Ok(tenant.schema_name)
            }
            None => {
                let fallback = fallback_schema_name(tenant_id);
                tracing::warn!(
                    tenant_id = %tenant_id,
                    schema = %fallback,
                    "tenant not in registry, applying fallback schema name"
                );
                Ok(fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    fn tid(s: &str) -> TenantId {
        s.parse().unwrap()
    }

    /// A lazily-constructed pool pointing nowhere: cache hits never touch
    /// it, misses surface a connection failure.
    fn unreachable_pool() -> PgPool {
        PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://nobody@127.0.0.1:1/nothing")
            .expect("lazy pool construction is infallible")
    }

    #[tokio::test]
    async fn test_cache_hit_skips_registry() {
        let resolver = SchemaResolver::new(unreachable_pool());
        resolver.cache().put(tid("t1"), "tenant_abc".to_string());

        let schema = resolver.resolve(&tid("t1")).await.unwrap();
        assert_eq!(schema, "tenant_abc");
    }

    #[tokio::test]
    async fn test_repeated_resolution_is_stable() {
        let resolver = SchemaResolver::new(unreachable_pool());
        resolver.cache().put(tid("t1"), "tenant_abc".to_string());

        for _ in 0..5 {
            assert_eq!(resolver.resolve(&tid("t1")).await.unwrap(), "tenant_abc");
        }
    }

    #[tokio::test]
    async fn test_registry_unavailable_propagates() {
        let resolver = SchemaResolver::new(unreachable_pool());

        let result = resolver.resolve(&tid("t9")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_shared_cache_between_resolvers() {
        let cache = SchemaCache::new();
        let a = SchemaResolver::with_cache(unreachable_pool(), cache.clone());
        let b = SchemaResolver::with_cache(unreachable_pool(), cache);

        a.cache().put(tid("t1"), "tenant_abc".to_string());
        assert_eq!(b.resolve(&tid("t1")).await.unwrap(), "tenant_abc");
    }
}
