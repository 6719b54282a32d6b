//! Schema definitions and migration utilities.
//!
//! Migrations are embedded SQL files applied in order. Applied ids are
//! recorded in `schema_migrations`, so each migration (including the seed
//! data) runs exactly once per database.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// An embedded migration.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Stable identifier recorded once applied.
    pub id: &'static str,
    pub sql: &'static str,
}

/// Embedded migration SQL for the core schema (001_schema.sql).
pub const SCHEMA_MIGRATION: &str = include_str!("../../../migrations/001_schema.sql");

/// Embedded migration SQL for the sample data (002_seed.sql).
pub const SEED_MIGRATION: &str = include_str!("../../../migrations/002_seed.sql");

/// All migrations, in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        id: "001_schema",
        sql: SCHEMA_MIGRATION,
    },
    Migration {
        id: "002_seed",
        sql: SEED_MIGRATION,
    },
];

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_migrations (
        id         TEXT PRIMARY KEY,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// Run all pending migrations against the database.
///
/// Safe to call from several instances at once: the bookkeeping table is
/// locked for the duration of each migration's transaction.
///
/// # Errors
///
/// Returns an error if any migration fails to execute. A failed migration
/// is rolled back and not recorded.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    sqlx::raw_sql(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Migration(format!("Bookkeeping table failed: {}", e)))?;

    for migration in MIGRATIONS {
        let mut tx = pool.begin().await?;

        sqlx::query("LOCK TABLE schema_migrations IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let applied: (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM schema_migrations WHERE id = $1)"#)
                .bind(migration.id)
                .fetch_one(&mut *tx)
                .await?;

        if applied.0 {
            tracing::debug!(migration = migration.id, "Migration already applied");
            tx.commit().await?;
            continue;
        }

        tracing::debug!(migration = migration.id, "Applying migration");
        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StoreError::Migration(format!("Migration {} failed: {}", migration.id, e))
            })?;

        sqlx::query(r#"INSERT INTO schema_migrations (id) VALUES ($1)"#)
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(migration = migration.id, "Migration applied");
    }

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Ids of the migrations recorded as applied, in application order.
pub async fn applied_migrations(pool: &PgPool) -> StoreResult<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as(r#"SELECT id FROM schema_migrations ORDER BY id"#)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
