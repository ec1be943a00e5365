//! Schema definitions and migration utilities.
//!
//! The schema is embedded at compile time and applied on startup. The
//! migration SQL is idempotent, so re-running it is always safe.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the core schema (001_annotations.sql).
pub const SCHEMA_MIGRATION: &str = include_str!("../../../migrations/001_annotations.sql");

/// Run all pending migrations against the database.
///
/// This function is idempotent - it can be run multiple times safely.
///
/// # Errors
///
/// Returns an error if the migration SQL fails to execute.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    sqlx::raw_sql(SCHEMA_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Migration(format!("Schema migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Check if the schema has been initialized.
///
/// Returns true if the `annotations` table exists.
pub async fn is_schema_initialized(pool: &PgPool) -> StoreResult<bool> {
    let result: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = 'annotations'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}
