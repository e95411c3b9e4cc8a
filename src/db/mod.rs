//! Access to the five identity stores.
//!
//! Each backend module owns its connection setup, migrations and a
//! [`IdentityStoreRepo`] implementation. [`DbPool`] picks the backend from
//! configuration and hands out the repository as a trait object.

mod error;
#[cfg(feature = "database-postgres")]
pub mod postgres;
pub mod repos;
#[cfg(feature = "database-sqlite")]
pub mod sqlite;

#[cfg(all(test, feature = "database-sqlite"))]
pub mod tests;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

enum Backend {
    #[cfg(feature = "database-sqlite")]
    Sqlite(sqlx::SqlitePool),
    #[cfg(feature = "database-postgres")]
    Postgres(sqlx::PgPool),
    #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
    _None(std::convert::Infallible),
}

/// Connection pool plus the identity store repository built on it.
pub struct DbPool {
    backend: Backend,
    identity_stores: Arc<dyn IdentityStoreRepo>,
}

impl DbPool {
    #[cfg(feature = "database-sqlite")]
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        Self {
            identity_stores: Arc::new(sqlite::SqliteIdentityStoreRepo::new(pool.clone())),
            backend: Backend::Sqlite(pool),
        }
    }

    #[cfg(feature = "database-postgres")]
    pub fn from_postgres(pool: sqlx::PgPool) -> Self {
        Self {
            identity_stores: Arc::new(postgres::PostgresIdentityStoreRepo::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::None => Err(DbError::NotConfigured),
            #[cfg(feature = "database-sqlite")]
            DatabaseConfig::Sqlite(sqlite_config) => {
                sqlite::connect(sqlite_config).await.map(Self::from_sqlite)
            }
            #[cfg(feature = "database-postgres")]
            DatabaseConfig::Postgres(pg_config) => {
                postgres::connect(pg_config).await.map(Self::from_postgres)
            }
        }
    }

    /// Bring the identity store tables up to date.
    pub async fn run_migrations(&self) -> DbResult<()> {
        match &self.backend {
            #[cfg(feature = "database-sqlite")]
            Backend::Sqlite(pool) => sqlite::migrate(pool).await?,
            #[cfg(feature = "database-postgres")]
            Backend::Postgres(pool) => postgres::migrate(pool).await?,
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            Backend::_None(never) => match *never {},
        }
        tracing::info!("Identity store migrations applied");
        Ok(())
    }

    pub fn identity_stores(&self) -> Arc<dyn IdentityStoreRepo> {
        Arc::clone(&self.identity_stores)
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> DbResult<()> {
        match &self.backend {
            #[cfg(feature = "database-sqlite")]
            Backend::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(drop)?,
            #[cfg(feature = "database-postgres")]
            Backend::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(drop)?,
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            Backend::_None(never) => match *never {},
        }
        Ok(())
    }

    /// Close every connection. Outstanding queries finish first.
    pub async fn close(&self) {
        match &self.backend {
            #[cfg(feature = "database-sqlite")]
            Backend::Sqlite(pool) => pool.close().await,
            #[cfg(feature = "database-postgres")]
            Backend::Postgres(pool) => pool.close().await,
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            Backend::_None(never) => match *never {},
        }
    }
}
