//! First-match resolution of a login id across the identity stores.

use std::{fmt, sync::Arc, time::Duration};

use serde_json::{Map, Value};

use super::{LoginError, STORE_REGISTRY, StoreDescriptor, StoreKind};
use crate::{db::IdentityStoreRepo, models::StoredIdentity};

/// Document field holding the bcrypt hash.
const CREDENTIAL_FIELD: &str = "password";
/// Document field admin stores keep the role in.
const ROLE_FIELD: &str = "role";

/// A record found for one login attempt, with its role already resolved.
///
/// Lives only for the duration of the attempt. The credential hash is held
/// apart from `fields` and has no public accessor outside the auth module.
#[derive(Clone)]
pub struct IdentityRecord {
    pub store: StoreKind,
    /// Durable reference; becomes the session subject.
    pub subject_id: String,
    /// The store's natural key value for this record.
    pub unique_id: String,
    /// Never empty.
    pub role: String,
    /// Remaining document fields, credential hash excluded.
    pub fields: Map<String, Value>,
    credential_hash: Option<String>,
}

impl IdentityRecord {
    fn from_stored(descriptor: &StoreDescriptor, stored: StoredIdentity) -> Self {
        let StoredIdentity {
            id, key, mut document, ..
        } = stored;

        let credential_hash = match document.remove(CREDENTIAL_FIELD) {
            Some(Value::String(hash)) => Some(hash),
            _ => None,
        };
        let role = descriptor
            .role_rule
            .resolve(document.get(ROLE_FIELD).and_then(Value::as_str));

        Self {
            store: descriptor.kind,
            subject_id: id,
            unique_id: key,
            role,
            fields: document,
            credential_hash,
        }
    }

    pub(crate) fn credential_hash(&self) -> Option<&str> {
        self.credential_hash.as_deref()
    }

    pub fn descriptor(&self) -> &'static StoreDescriptor {
        self.store.descriptor()
    }
}

impl fmt::Debug for IdentityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRecord")
            .field("store", &self.store)
            .field("subject_id", &self.subject_id)
            .field("unique_id", &self.unique_id)
            .field("role", &self.role)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field(
                "credential_hash",
                &self.credential_hash.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Resolves a login id against [`STORE_REGISTRY`] in precedence order.
///
/// Lookups run one at a time. The first store holding the id wins and no
/// later store is consulted. A failed or timed-out lookup aborts resolution
/// with [`LoginError::Backend`]; only a clean miss moves on to the next store.
#[derive(Clone)]
pub struct Resolver {
    repo: Arc<dyn IdentityStoreRepo>,
    lookup_timeout: Duration,
}

impl Resolver {
    pub fn new(repo: Arc<dyn IdentityStoreRepo>, lookup_timeout: Duration) -> Self {
        Self {
            repo,
            lookup_timeout,
        }
    }

    pub async fn resolve(&self, login_id: &str) -> Result<IdentityRecord, LoginError> {
        if login_id.is_empty() {
            return Err(LoginError::Validation);
        }

        for descriptor in &STORE_REGISTRY {
            let lookup = self.repo.find_by_key(descriptor.kind, login_id);
            let found = match tokio::time::timeout(self.lookup_timeout, lookup).await {
                Ok(Ok(found)) => found,
                Ok(Err(e)) => {
                    return Err(LoginError::Backend(format!(
                        "lookup in {} failed: {}",
                        descriptor.name, e
                    )));
                }
                Err(_) => {
                    return Err(LoginError::Backend(format!(
                        "lookup in {} timed out after {:?}",
                        descriptor.name, self.lookup_timeout
                    )));
                }
            };

            match found {
                Some(stored) => {
                    tracing::debug!(store = descriptor.name, "Login id resolved");
                    return Ok(IdentityRecord::from_stored(descriptor, stored));
                }
                None => tracing::trace!(store = descriptor.name, "Login id not in store"),
            }
        }

        Err(LoginError::NotFound)
    }
}
