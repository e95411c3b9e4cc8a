use thiserror::Error;

use crate::auth::StoreKind;

/// Failures reading or writing the identity stores.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("no [database] section is configured")]
    NotConfigured,

    /// The store already holds a record with this natural key.
    #[error("{store} already holds a record keyed '{key}'")]
    Conflict { store: StoreKind, key: String },

    #[error("invalid identity record: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[cfg(any(feature = "database-sqlite", feature = "database-postgres"))]
    #[error("query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[cfg(any(feature = "database-sqlite", feature = "database-postgres"))]
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Internal(String),
}

impl DbError {
    /// Classify an insert failure; a unique-key violation becomes
    /// [`DbError::Conflict`].
    #[cfg(any(feature = "database-sqlite", feature = "database-postgres"))]
    pub(crate) fn on_insert(err: sqlx::Error, store: StoreKind, key: &str) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Conflict {
                store,
                key: key.to_string(),
            },
            other => DbError::Sqlx(other),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
