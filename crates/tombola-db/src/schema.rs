//! Schema naming: the deterministic fallback convention, identifier
//! validation, and the search-path statement.
//!
//! Schema names end up interpolated into `SET search_path` statements —
//! identifiers cannot be bound as parameters — so everything that reaches
//! that statement passes [`is_valid_schema_name`] first, whether it came
//! from the registry or from the fallback convention.

use tombola_core::TenantId;

/// Postgres identifier length limit.
const MAX_SCHEMA_LEN: usize = 63;

/// Prefix for schema names derived from a tenant id.
pub(crate) const SCHEMA_PREFIX: &str = "tenant_";

/// The shared schema holding the tenant registry.
pub(crate) const GLOBAL_SCHEMA: &str = "public";

/// Derives the fallback schema name for a tenant with no registry entry.
///
/// Deterministic: the tenant id is lowercased, every character outside
/// `[a-z0-9_]` becomes `_`, the result is prefixed with `tenant_` and
/// truncated to the Postgres identifier limit. The same id always yields
/// the same name.
///
/// ```
/// use tombola_db::fallback_schema_name;
///
/// let id = "t9".parse().unwrap();
/// assert_eq!(fallback_schema_name(&id), "tenant_t9");
/// ```
#[must_use]
pub fn fallback_schema_name(tenant_id: &TenantId) -> String {
    let sanitized: String = tenant_id
        .as_str()
        .to_ascii_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut name = format!("{SCHEMA_PREFIX}{sanitized}");
    name.truncate(MAX_SCHEMA_LEN);
    name
}

/// Whether `name` is safe to interpolate as a schema identifier.
///
/// Accepts `[a-z0-9_]`, not starting with a digit, at most 63 characters.
#[must_use]
pub fn is_valid_schema_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_SCHEMA_LEN {
        return false;
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or('0');
    if !(first.is_ascii_lowercase() || first == '_') {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Builds the statement that sets the connection's schema search order to
/// `[tenant schema, public]`.
#[must_use]
pub fn search_path_statement(schema: &str) -> String {
    format!(r#"SET search_path TO "{schema}", {GLOBAL_SCHEMA}"#)
}
