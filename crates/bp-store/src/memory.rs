use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde_json::Value;
use time::OffsetDateTime;

use crate::record::{IdGenerator, stamp};
use crate::{DocumentStore, StoreError, validate_collection};

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<Value>>>,
    ids: IdGenerator,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.read().values().all(Vec::is_empty)
    }
}

impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn create_document(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        validate_collection(collection)?;
        let now = OffsetDateTime::now_utc();
        let id = self.ids.next_id(collection, now);
        let record = stamp(document, &id, now)?;

        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(record);
        Ok(id)
    }

    fn list_documents(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        validate_collection(collection)?;
        Ok(self
            .collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use serde_json::json;

    use super::MemoryStore;
    use crate::{DocumentStore, ID_FIELD, StoreError};

    #[test]
    fn create_then_list_in_order() {
        let store = MemoryStore::new();
        let first = store
            .create_document("blueprint", json!({"title": "one"}))
            .expect("create");
        let second = store
            .create_document("blueprint", json!({"title": "two"}))
            .expect("create");

        let records = store.list_documents("blueprint").expect("list");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][ID_FIELD], json!(first));
        assert_eq!(records[1][ID_FIELD], json!(second));
        assert_eq!(records[1]["title"], json!("two"));
    }

    #[test]
    fn collections_are_isolated() {
        let store = MemoryStore::new();
        store
            .create_document("blueprint", json!({}))
            .expect("create");
        assert_eq!(store.len("blueprint"), 1);
        assert!(store.list_documents("other").expect("list").is_empty());
        assert!(!store.is_empty());
    }

    #[test]
    fn rejects_non_object_documents() {
        let store = MemoryStore::new();
        let error = store
            .create_document("blueprint", json!("text"))
            .expect_err("strings are not documents");
        assert!(matches!(error, StoreError::InvalidDocument { kind: "string" }));
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_writers_do_not_lose_records() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for item in 0..16 {
                        store
                            .create_document("blueprint", json!({"worker": worker, "item": item}))
                            .expect("create");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }
        assert_eq!(store.len("blueprint"), 128);
    }
}
