//! Shared setup for database and end-to-end tests.

use serde_json::Value;
use sqlx::SqlitePool;

use crate::{
    auth::StoreKind,
    db::DbPool,
    models::{CreateIdentity, StoredIdentity},
};

/// Single-connection in-memory SQLite; a second connection would see an
/// empty database.
pub async fn create_sqlite_pool() -> SqlitePool {
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory SQLite pool")
}

/// A fresh database migrated through [`DbPool::run_migrations`].
pub async fn create_test_db() -> DbPool {
    let db = DbPool::from_sqlite(create_sqlite_pool().await);
    db.run_migrations().await.expect("identity store migrations");
    db
}

/// Insert a record into one of the identity stores.
pub async fn seed_identity(
    db: &DbPool,
    store: StoreKind,
    key: &str,
    document: Value,
) -> StoredIdentity {
    db.identity_stores()
        .create(store, CreateIdentity::new(key, document))
        .await
        .expect("seed identity")
}
