use super::{Document, DocumentStore, Fields, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// In-memory document store.
///
/// Documents keep insertion order within a collection, so a listing comes back
/// in the order the documents were seeded.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document, replacing any existing document with the same key.
    pub fn insert(&self, collection: &str, document: Document) {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|existing| existing.key == document.key) {
            Some(existing) => *existing = document,
            None => docs.push(document),
        }
    }

    /// Returns a copy of one document, if present.
    pub fn get(&self, collection: &str, key: &str) -> Option<Document> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.key == key).cloned())
    }

    /// Builds a store from seed JSON shaped as
    /// `{"<collection>": [{"id": "<key>", ...fields}, ...]}`.
    pub fn from_seed_json(raw: &str) -> Result<Self, StoreError> {
        let seed: HashMap<String, Vec<Fields>> =
            serde_json::from_str(raw).map_err(|e| StoreError::Decode(e.to_string()))?;

        let store = Self::new();
        for (collection, documents) in seed {
            for mut fields in documents {
                let key = match fields.remove("id") {
                    Some(Value::String(key)) => key,
                    Some(other) => other.to_string(),
                    None => {
                        return Err(StoreError::Decode(format!(
                            "seed document in '{collection}' has no id"
                        )))
                    }
                };
                store.insert(&collection, Document::new(key, fields));
            }
        }
        Ok(store)
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Transport(format!("{}: {e}", path.display())))?;
        Self::from_seed_json(&raw)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let docs = collections.get(collection).cloned().unwrap_or_default();
        debug!(collection, count = docs.len(), "listed in-memory collection");
        Ok(docs)
    }

    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.key == key))
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{key}")))?;
        for (field, value) in fields {
            doc.fields.insert(field, value);
        }
        Ok(())
    }
}
