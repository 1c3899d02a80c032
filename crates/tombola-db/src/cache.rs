//! Memoization of tenant-id → schema-name resolutions.

use moka::sync::Cache;
use tombola_core::TenantId;

/// Default bound on cached entries.
const DEFAULT_CAPACITY: u64 = 10_000;

/// Bounded cache of resolved schema names.
///
/// Schema names are immutable for a tenant's lifetime, so entries are never
/// proactively invalidated — the capacity bound exists for operational
/// safety only. Concurrent population of the same key is benign: every
/// writer stores the identical value, so last-write-wins races cannot
/// corrupt the mapping.
///
/// Only registry-confirmed names are cached. Fallback names are recomputed
/// on every statement so a tenant registered later is picked up without any
/// invalidation machinery.
#[derive(Debug, Clone)]
pub struct SchemaCache {
    inner: Cache<TenantId, String>,
}

impl SchemaCache {
    /// Creates a cache with the default capacity bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a cache bounded to `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }

    /// Looks up the schema name for a tenant.
    #[must_use]
    pub fn get(&self, tenant_id: &TenantId) -> Option<String> {
        self.inner.get(tenant_id)
    }

    /// Stores a resolved schema name.
    pub fn put(&self, tenant_id: TenantId, schema_name: String) {
        self.inner.insert(tenant_id, schema_name);
    }

    /// Approximate number of cached entries.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(s: &str) -> TenantId {
        s.parse().unwrap()
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = SchemaCache::new();
        assert_eq!(cache.get(&tid("t1")), None);

        cache.put(tid("t1"), "tenant_abc".to_string());
        assert_eq!(cache.get(&tid("t1")), Some("tenant_abc".to_string()));
    }

    #[test]
    fn test_repeated_lookups_are_stable() {
        let cache = SchemaCache::new();
        cache.put(tid("t1"), "tenant_abc".to_string());
        for _ in 0..10 {
            assert_eq!(cache.get(&tid("t1")), Some("tenant_abc".to_string()));
        }
    }

    #[test]
    fn test_concurrent_population_of_same_key() {
        let cache = SchemaCache::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    cache.put(tid("t1"), "tenant_abc".to_string());
                    if let Some(value) = cache.get(&tid("t1")) {
                        assert_eq!(value, "tenant_abc");
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.get(&tid("t1")), Some("tenant_abc".to_string()));
    }

    #[test]
    fn test_distinct_keys_do_not_collide() {
        let cache = SchemaCache::new();
        cache.put(tid("t1"), "tenant_one".to_string());
        cache.put(tid("t2"), "tenant_two".to_string());
        assert_eq!(cache.get(&tid("t1")), Some("tenant_one".to_string()));
        assert_eq!(cache.get(&tid("t2")), Some("tenant_two".to_string()));
    }
}
