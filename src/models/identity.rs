use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// A record as it sits in one of the identity stores.
///
/// `document` is the store's own schema and is not interpreted here; it
/// normally carries the bcrypt hash under `password` and, in the admin
/// stores, an optional `role`.
#[derive(Clone)]
pub struct StoredIdentity {
    /// Internal, durable reference for the record.
    pub id: String,
    /// Natural key value (teacher id, admission number or admin id).
    pub key: String,
    pub document: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for StoredIdentity {
    // Documents hold credential hashes; only show which fields are present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredIdentity")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("fields", &self.document.keys().collect::<Vec<_>>())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for inserting a record into an identity store.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct CreateIdentity {
    #[validate(length(min = 1, max = 128))]
    pub key: String,
    pub document: Map<String, Value>,
}

impl CreateIdentity {
    pub fn new(key: impl Into<String>, document: Value) -> Self {
        let document = match document {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            key: key.into(),
            document,
        }
    }
}

impl fmt::Debug for CreateIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateIdentity")
            .field("key", &self.key)
            .field("fields", &self.document.keys().collect::<Vec<_>>())
            .finish()
    }
}
