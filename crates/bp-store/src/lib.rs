#![forbid(unsafe_code)]

//! Document storage for parsed blueprints.
//!
//! A [`DocumentStore`] holds schemaless JSON objects grouped in named
//! collections. Two backends ship here: [`MemoryStore`] for tests and
//! throwaway servers, and [`FileStore`], which keeps one JSON file per record.
//! The [`blueprints`] module maps [`bp_core::Blueprint`] values onto records.

pub mod blueprints;
mod file;
mod memory;
mod record;

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use blueprints::{
    BLUEPRINT_COLLECTION, blueprint_from_record, list_blueprints, save_blueprint,
};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use record::{CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid collection name: {0:?}")]
    InvalidCollection(String),
    #[error("document must be a JSON object, got {kind}")]
    InvalidDocument { kind: &'static str },
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode document: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("malformed record in {location}: {message}")]
    Decode { location: String, message: String },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn decode(location: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            location: location.into(),
            message: message.to_string(),
        }
    }
}

/// Collection-oriented JSON document store.
///
/// Implementations stamp every created record with an opaque id and
/// creation/update timestamps, and return records in insertion order.
pub trait DocumentStore: Send + Sync {
    /// Short backend name, for probes and logs.
    fn backend(&self) -> &'static str;

    /// Connectivity probe.
    fn ping(&self) -> Result<(), StoreError>;

    /// Persist `document` (a JSON object) and return its new id.
    fn create_document(&self, collection: &str, document: Value) -> Result<String, StoreError>;

    /// Every record in `collection`, oldest first. Unknown collections are empty.
    fn list_documents(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

impl StoreBackend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Some(Self::Memory),
            "file" | "fs" => Some(Self::File),
            _ => None,
        }
    }
}

/// Open the configured backend. `data_dir` is only used by [`FileStore`].
pub fn open_store(
    backend: StoreBackend,
    data_dir: &Path,
) -> Result<Box<dyn DocumentStore>, StoreError> {
    match backend {
        StoreBackend::Memory => Ok(Box::new(MemoryStore::new())),
        StoreBackend::File => Ok(Box::new(FileStore::open(data_dir)?)),
    }
}

pub(crate) fn validate_collection(collection: &str) -> Result<(), StoreError> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(collection.to_string()))
    }
}
