use std::fmt::Write as _;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::StoreError;

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Hex characters kept from the digest; matches the width of a Mongo ObjectId.
const ID_HEX_LEN: usize = 24;

/// Per-store id source. Ids are unique within a process and unpredictable
/// enough to be used as opaque handles.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    counter: AtomicU64,
}

impl IdGenerator {
    pub(crate) fn next_id(&self, collection: &str, now: OffsetDateTime) -> String {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(collection.as_bytes());
        hasher.update(now.unix_timestamp_nanos().to_le_bytes());
        hasher.update(sequence.to_le_bytes());
        hasher.update(process::id().to_le_bytes());
        let digest = hasher.finalize();

        let mut id = String::with_capacity(ID_HEX_LEN);
        for byte in digest.iter().take(ID_HEX_LEN / 2) {
            let _ = write!(id, "{byte:02x}");
        }
        id
    }
}

/// Add `_id`, `created_at` and `updated_at` to an object document.
pub(crate) fn stamp(document: Value, id: &str, now: OffsetDateTime) -> Result<Value, StoreError> {
    let kind = json_kind(&document);
    let Value::Object(mut fields) = document else {
        return Err(StoreError::InvalidDocument { kind });
    };

    let timestamp = now
        .format(&Rfc3339)
        .map_err(|error| StoreError::decode("timestamp", error))?;
    fields.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    fields.insert(
        CREATED_AT_FIELD.to_string(),
        Value::String(timestamp.clone()),
    );
    fields.insert(UPDATED_AT_FIELD.to_string(), Value::String(timestamp));
    Ok(Value::Object(fields))
}

pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
