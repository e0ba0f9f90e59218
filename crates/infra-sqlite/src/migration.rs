// Migration Runner

use sqlx::SqlitePool;
use tracing::info;
use worksite_core::error::Result;

use crate::match_store::map_sqlx_error;

/// Ordered schema migrations, embedded at compile time
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../migrations/001_initial_schema.sql"))];

/// Run database migrations
///
/// Each pending migration executes inside one transaction together with its
/// schema_version bookkeeping row, so a failed migration leaves no
/// half-applied schema behind.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY, applied_at INTEGER NOT NULL)",
    )
    .execute(pool)
    .await
    .map_err(map_sqlx_error)?;

    let current_version: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
            .fetch_one(pool)
            .await
            .map_err(map_sqlx_error)?;

    for &(version, sql) in MIGRATIONS {
        if version <= current_version {
            continue;
        }
        info!(version, "Applying schema migration");

        let mut tx = pool.begin().await.map_err(map_sqlx_error)?;
        sqlx::raw_sql(sql)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        sqlx::query(
            "INSERT INTO schema_version (version, applied_at) VALUES (?, strftime('%s', 'now') * 1000)",
        )
        .bind(version)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;
    }

    Ok(())
}
