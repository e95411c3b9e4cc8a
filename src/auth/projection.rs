//! The external shape of a logged-in user.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{IdentifierField, IdentityRecord};

/// Key fragments that mark a field as credential material. Matched
/// case-insensitively anywhere in the key, at every nesting level.
const SENSITIVE_KEY_FRAGMENTS: [&str; 5] = ["password", "passwd", "pwd", "hash", "secret"];

/// Keys the projection always derives itself instead of copying.
const RESERVED_KEYS: [&str; 3] = ["id", "_id", "role"];

/// Redacted, normalized user object returned on login.
///
/// Carries the record's own fields, a canonical `role`, an `id` equal to the
/// session subject, and exactly one of `teacherId`, `admissionNo` or
/// `adminId`. The other two are absent, not null.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserProjection(Map<String, Value>);

impl UserProjection {
    pub fn from_record(record: &IdentityRecord) -> Self {
        let mut fields = redact(&record.fields);

        for field in IdentifierField::ALL {
            fields.remove(field.as_str());
        }
        for key in RESERVED_KEYS {
            fields.remove(key);
        }

        fields.insert("id".into(), Value::String(record.subject_id.clone()));
        fields.insert(
            record.descriptor().key_field.as_str().into(),
            Value::String(record.unique_id.clone()),
        );
        fields.insert("role".into(), Value::String(record.role.clone()));

        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| key.contains(fragment))
}

fn redact(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(key, _)| !is_sensitive(key))
        .map(|(key, value)| (key.clone(), redact_value(value)))
        .collect()
}

fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(redact(map)),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        other => other.clone(),
    }
}
