mod identity_stores;

use std::time::Duration;

pub use identity_stores::PostgresIdentityStoreRepo;
use sqlx::{PgPool, postgres::PgPoolOptions};

use super::DbResult;
use crate::config::PostgresConfig;

pub(super) async fn connect(config: &PostgresConfig) -> DbResult<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;
    tracing::info!(
        max_connections = config.max_connections,
        "Identity stores opened on PostgreSQL"
    );
    Ok(pool)
}

pub(super) async fn migrate(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("./migrations_sqlx/postgres").run(pool).await?;
    Ok(())
}
