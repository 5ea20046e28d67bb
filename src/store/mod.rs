/*!
 * # Document Store
 *
 * Access to the remote document database that holds the order collection.
 * The board only ever needs two calls: read a whole collection once, and
 * patch a few top-level fields of one document.
 */

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod firestore;
pub mod memory;

pub use firestore::{FirestoreSettings, FirestoreStore};
pub use memory::InMemoryDocumentStore;

/// Partial document body sent with an update.
pub type Fields = Map<String, Value>;

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("No document to update: {0}")]
    NotFound(String),
    #[error("Malformed document: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

/// A stored document: its key plus its top-level fields as plain JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(key: impl Into<String>, fields: Fields) -> Self {
        Self {
            key: key.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Document store trait for different backends
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads every document in `collection`, in the store's native order.
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Overwrites the given top-level fields of an existing document.
    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;
}
