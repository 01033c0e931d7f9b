use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Number of forward migrations shipped with the binary. Reversible
/// migrations list their `.down.sql` half too, which never lands in history.
pub fn expected_count() -> i64 {
    MIGRATOR.iter().filter(|migration| !migration.migration_type.is_down_migration()).count() as i64
}

/// Number of migrations recorded as applied in `_sqlx_migrations`.
pub async fn applied_count(pool: &DbPool) -> Result<i64, sqlx::Error> {
    let exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if exists == 0 {
        return Ok(0);
    }

    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
}
