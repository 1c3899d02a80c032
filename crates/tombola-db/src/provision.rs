//! Tenant schema provisioning.
//!
//! Registration creates one schema per tenant holding a fixed set of tables,
//! structurally identical across tenants. All DDL addresses the new schema
//! by qualified name, so provisioning needs no search-path manipulation and
//! cannot be misrouted by an active tenant context.

use crate::error::DbError;
use crate::schema::is_valid_schema_name;
use sqlx::PgConnection;

/// Per-tenant table definitions, templated on the schema name.
fn tenant_ddl(schema: &str) -> Vec<String> {
    vec![
        format!(r#"CREATE SCHEMA IF NOT EXISTS "{schema}""#),
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{schema}".users (
                user_id        VARCHAR(64) PRIMARY KEY,
                username       VARCHAR(64) NOT NULL UNIQUE,
                password_hash  VARCHAR(255) NOT NULL,
                email          VARCHAR(255),
                phone          VARCHAR(32),
                real_name      VARCHAR(128),
                role           VARCHAR(32) NOT NULL DEFAULT 'VIEWER',
                status         VARCHAR(32) NOT NULL DEFAULT 'ACTIVE',
                last_login_at  TIMESTAMPTZ,
                created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                created_by     VARCHAR(64)
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{schema}".lottery_activities (
                activity_id        VARCHAR(64) PRIMARY KEY,
                activity_name      VARCHAR(255) NOT NULL,
                description        TEXT,
                status             VARCHAR(32) NOT NULL DEFAULT 'DRAFT',
                start_time         TIMESTAMPTZ,
                end_time           TIMESTAMPTZ,
                total_participants INTEGER NOT NULL DEFAULT 0,
                total_winners      INTEGER NOT NULL DEFAULT 0,
                created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                created_by         VARCHAR(64)
            )"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{schema}".prizes (
                prize_id       VARCHAR(64) PRIMARY KEY,
                activity_id    VARCHAR(64) NOT NULL,
                prize_name     VARCHAR(255) NOT NULL,
                prize_level    INTEGER NOT NULL DEFAULT 1,
                gift_name      VARCHAR(255),
                gift_image_url VARCHAR(512),
                total_quota    INTEGER NOT NULL DEFAULT 1,
                drawn_count    INTEGER NOT NULL DEFAULT 0,
                draw_order     INTEGER NOT NULL DEFAULT 1,
                status         VARCHAR(32) NOT NULL DEFAULT 'PENDING',
                created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#
        ),
        format!(
            r#"CREATE INDEX IF NOT EXISTS idx_prizes_activity
               ON "{schema}".prizes (activity_id, draw_order)"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{schema}".participants (
                participant_id VARCHAR(64) PRIMARY KEY,
                activity_id    VARCHAR(64) NOT NULL,
                name           VARCHAR(128) NOT NULL,
                employee_no    VARCHAR(64),
                department     VARCHAR(128),
                phone          VARCHAR(32),
                email          VARCHAR(255),
                is_winner      BOOLEAN NOT NULL DEFAULT FALSE,
                import_batch   VARCHAR(64),
                created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#
        ),
        format!(
            r#"CREATE INDEX IF NOT EXISTS idx_participants_activity
               ON "{schema}".participants (activity_id)"#
        ),
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{schema}".winner_records (
                record_id        VARCHAR(64) PRIMARY KEY,
                activity_id      VARCHAR(64) NOT NULL,
                prize_id         VARCHAR(64) NOT NULL,
                participant_id   VARCHAR(64) NOT NULL,
                participant_name VARCHAR(128) NOT NULL,
                prize_name       VARCHAR(255) NOT NULL,
                gift_name        VARCHAR(255),
                draw_time        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                draw_sequence    INTEGER NOT NULL DEFAULT 1,
                operator_id      VARCHAR(64),
                remarks          TEXT,
                created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#
        ),
        format!(
            r#"CREATE INDEX IF NOT EXISTS idx_winner_records_activity
               ON "{schema}".winner_records (activity_id, draw_time)"#
        ),
    ]
}

/// Creates the tenant registry table in the global schema.
///
/// Runs once at startup, before the server accepts requests. Idempotent.
///
/// # Errors
///
/// Returns `DbError::QueryFailed` on DDL failure.
pub async fn ensure_registry(pool: &sqlx::PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS public.tenants (
            tenant_id        VARCHAR(64) PRIMARY KEY,
            tenant_code      VARCHAR(64) NOT NULL UNIQUE,
            tenant_name      VARCHAR(255) NOT NULL,
            schema_name      VARCHAR(63) NOT NULL UNIQUE,
            admin_user_id    VARCHAR(64) NOT NULL,
            status           VARCHAR(32) NOT NULL DEFAULT 'ACTIVE',
            max_users        INTEGER NOT NULL DEFAULT 10,
            max_activities   INTEGER NOT NULL DEFAULT 100,
            storage_quota_mb INTEGER NOT NULL DEFAULT 1024,
            created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await
    .map_err(DbError::QueryFailed)?;

    tracing::info!("tenant registry ensured");
    Ok(())
}

/// Creates a tenant's schema and its tables on `conn`.
///
/// Idempotent (`IF NOT EXISTS` throughout); runs on the caller's
/// connection so registration can wrap it in the same transaction as the
/// registry insert.
///
/// # Errors
///
/// Returns `DbError::InvalidSchemaName` for a name that fails validation
/// and `DbError::QueryFailed` for DDL failures.
pub async fn provision_tenant_schema(
    conn: &mut PgConnection,
    schema_name: &str,
) -> Result<(), DbError> {
    if !is_valid_schema_name(schema_name) {
        return Err(DbError::InvalidSchemaName(schema_name.to_string()));
    }

    for statement in tenant_ddl(schema_name) {
        sqlx::query(&statement)
            .execute(&mut *conn)
            .await
            .map_err(DbError::QueryFailed)?;
    }

    tracing::info!(schema = %schema_name, "tenant schema provisioned");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ddl_addresses_schema_qualified_names() {
        let statements = tenant_ddl("tenant_abc");
        assert!(statements.iter().all(|s| s.contains("\"tenant_abc\"")));
    }

    #[test]
    fn test_ddl_is_idempotent() {
        for statement in tenant_ddl("tenant_abc") {
            assert!(statement.contains("IF NOT EXISTS"), "{statement}");
        }
    }

    #[test]
    fn test_ddl_covers_all_tenant_tables() {
        let joined = tenant_ddl("tenant_abc").join("\n");
        for table in [
            "users",
            "lottery_activities",
            "prizes",
            "participants",
            "winner_records",
        ] {
            assert!(joined.contains(table), "missing table {table}");
        }
    }

    #[test]
    fn test_hostile_schema_name_fails_validation() {
        // provision_tenant_schema validates before emitting any DDL.
        assert!(!is_valid_schema_name("bad;name"));
        assert!(!is_valid_schema_name("tenant\" CASCADE; --"));
    }
}
