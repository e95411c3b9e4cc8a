use async_trait::async_trait;

use crate::{
    auth::StoreKind,
    db::error::DbResult,
    models::{CreateIdentity, StoredIdentity},
};

/// Read and seed access to the five identity stores.
///
/// `store` only ever selects among compiled-in tables, so implementations
/// may interpolate [`StoreKind::table`] and [`StoreKind::key_column`] into
/// SQL. The login id itself is always bound.
#[async_trait]
pub trait IdentityStoreRepo: Send + Sync {
    /// Exact, case-sensitive match on the store's natural key.
    async fn find_by_key(&self, store: StoreKind, key: &str) -> DbResult<Option<StoredIdentity>>;

    async fn create(&self, store: StoreKind, input: CreateIdentity) -> DbResult<StoredIdentity>;
}
