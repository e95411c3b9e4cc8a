mod identity_stores;

use std::time::Duration;

pub use identity_stores::SqliteIdentityStoreRepo;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use super::DbResult;
use crate::config::SqliteConfig;

pub(super) async fn connect(config: &SqliteConfig) -> DbResult<SqlitePool> {
    let journal = if config.wal_mode {
        SqliteJournalMode::Wal
    } else {
        SqliteJournalMode::Delete
    };
    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(config.create_if_missing)
        .journal_mode(journal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;
    tracing::info!(path = %config.path, "Identity stores opened on SQLite");
    Ok(pool)
}

pub(super) async fn migrate(pool: &SqlitePool) -> DbResult<()> {
    sqlx::migrate!("./migrations_sqlx/sqlite").run(pool).await?;
    Ok(())
}
