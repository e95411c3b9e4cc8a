use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow, types::Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::StoreKind,
    db::{
        error::{DbError, DbResult},
        repos::IdentityStoreRepo,
    },
    models::{CreateIdentity, StoredIdentity},
};

pub struct SqliteIdentityStoreRepo {
    pool: SqlitePool,
}

impl SqliteIdentityStoreRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_identity(row: &SqliteRow) -> DbResult<StoredIdentity> {
        let Json(document): Json<Map<String, Value>> = row.try_get("document")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(StoredIdentity {
            id: row.try_get("id")?,
            key: row.try_get("natural_key")?,
            document,
            created_at,
        })
    }
}

#[async_trait]
impl IdentityStoreRepo for SqliteIdentityStoreRepo {
    async fn find_by_key(&self, store: StoreKind, key: &str) -> DbResult<Option<StoredIdentity>> {
        let query = format!(
            r#"
            SELECT id, {key_column} AS natural_key, document, created_at
            FROM {table}
            WHERE {key_column} = ?
            "#,
            key_column = store.key_column(),
            table = store.table(),
        );

        let row = sqlx::query(&query)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_identity).transpose()
    }

    async fn create(&self, store: StoreKind, input: CreateIdentity) -> DbResult<StoredIdentity> {
        input.validate()?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let query = format!(
            r#"
            INSERT INTO {table} (id, {key_column}, document, created_at)
            VALUES (?, ?, ?, ?)
            "#,
            key_column = store.key_column(),
            table = store.table(),
        );

        sqlx::query(&query)
            .bind(&id)
            .bind(&input.key)
            .bind(Json(&input.document))
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::on_insert(e, store, &input.key))?;

        Ok(StoredIdentity {
            id,
            key: input.key,
            document: input.document,
            created_at: now,
        })
    }
}
