use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::record::{IdGenerator, stamp};
use crate::{DocumentStore, StoreError, validate_collection};

const RECORD_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// One directory per collection, one pretty-printed JSON file per record.
///
/// File names start with a zero-padded creation timestamp so a directory
/// listing sorted by name is also sorted by insertion. Writes go through a
/// temporary file and a rename, so readers never see half a record.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    ids: IdGenerator,
    /// Last timestamp handed out; serializes writers and keeps names monotonic.
    last_stamp: Mutex<i128>,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|error| StoreError::io(&root, error))?;
        debug!("Opened file store at {}", root.display());
        Ok(Self {
            root,
            ids: IdGenerator::default(),
            last_stamp: Mutex::new(0),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }
}

impl DocumentStore for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    fn ping(&self) -> Result<(), StoreError> {
        let metadata = fs::metadata(&self.root).map_err(|error| StoreError::io(&self.root, error))?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(StoreError::io(
                &self.root,
                std::io::Error::other("store root is not a directory"),
            ))
        }
    }

    fn create_document(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        validate_collection(collection)?;
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir).map_err(|error| StoreError::io(&dir, error))?;

        let mut last_stamp = self.last_stamp.lock();
        let mut now = OffsetDateTime::now_utc();
        let mut nanos = now.unix_timestamp_nanos();
        if nanos <= *last_stamp {
            nanos = *last_stamp + 1;
            now = OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(now);
        }
        *last_stamp = nanos;

        let id = self.ids.next_id(collection, now);
        let record = stamp(document, &id, now)?;
        let encoded = serde_json::to_vec_pretty(&record).map_err(StoreError::Serialize)?;

        let final_path = dir.join(format!("{nanos:020}-{id}.{RECORD_EXTENSION}"));
        let temp_path = final_path.with_extension(TEMP_EXTENSION);
        write_file(&temp_path, &encoded)?;
        fs::rename(&temp_path, &final_path).map_err(|error| StoreError::io(&final_path, error))?;

        debug!("Stored {collection} record {id} at {}", final_path.display());
        Ok(id)
    }

    fn list_documents(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        validate_collection(collection)?;
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|error| StoreError::io(&dir, error))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| StoreError::io(&dir, error))?;
            let path = entry.path();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some(RECORD_EXTENSION) => paths.push(path),
                Some(TEMP_EXTENSION) => warn!("Ignoring unfinished write {}", path.display()),
                _ => {}
            }
        }
        paths.sort();

        paths
            .iter()
            .map(|path| {
                let bytes = fs::read(path).map_err(|error| StoreError::io(path, error))?;
                serde_json::from_slice(&bytes)
                    .map_err(|error| StoreError::decode(path.display().to_string(), error))
            })
            .collect()
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let mut file = fs::File::create(path).map_err(|error| StoreError::io(path, error))?;
    file.write_all(contents)
        .and_then(|()| file.sync_all())
        .map_err(|error| StoreError::io(path, error))
}
