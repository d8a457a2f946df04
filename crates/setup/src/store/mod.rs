//! Document database abstraction.
//!
//! The provisioning pipeline talks to the database only through
//! [`DocumentStore`], so it runs unchanged against Firestore
//! ([`crate::firestore::FirestoreClient`]) and against [`InMemoryStore`]
//! (dry runs and tests).
//!
//! # Semantics
//!
//! - [`DocumentStore::commit`] applies a [`WriteBatch`] atomically: either
//!   every operation lands or none does.
//! - `Set` replaces the whole document; fields not in the new value are gone.
//! - `Delete` of a missing document succeeds.

pub mod document;
pub mod memory;

pub use document::{Document, FieldValue};
pub use memory::InMemoryStore;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed before the backend answered.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend refused the request.
    #[error("{message}")]
    Rejected {
        /// HTTP status returned by the backend.
        status: u16,
        /// Backend-supplied error message.
        message: String,
    },

    /// Could not obtain an access token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The backend answered with something we could not interpret.
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document cannot be expressed in the backend's format.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The store is not reachable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the backend reported that the target does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { status: 404, .. })
    }
}

/// Address of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocRef {
    pub collection: String,
    pub id: String,
}

impl DocRef {
    /// Reference document `id` in `collection`.
    #[must_use]
    pub fn new(collection: &str, id: impl AsRef<str>) -> Self {
        Self {
            collection: collection.to_owned(),
            id: id.as_ref().to_owned(),
        }
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// One operation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or fully replace a document.
    Set(DocRef, Document),
    /// Remove a document if it exists.
    Delete(DocRef),
}

impl WriteOp {
    /// The document this operation touches.
    #[must_use]
    pub const fn target(&self) -> &DocRef {
        match self {
            Self::Set(doc_ref, _) | Self::Delete(doc_ref) => doc_ref,
        }
    }
}

/// Operations committed together as one atomic unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a full-replace write.
    pub fn set(&mut self, doc_ref: DocRef, document: Document) -> &mut Self {
        self.ops.push(WriteOp::Set(doc_ref, document));
        self
    }

    /// Queue a delete.
    pub fn delete(&mut self, doc_ref: DocRef) -> &mut Self {
        self.ops.push(WriteOp::Delete(doc_ref));
        self
    }

    /// Queued operations in submission order.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

/// A document database the provisioning pipeline can write to.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Apply every operation in `batch` atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Fetch a document, `None` if it does not exist.
    async fn get(&self, doc_ref: &DocRef) -> Result<Option<Document>, StoreError>;

    /// Number of documents currently in `collection`.
    async fn count(&self, collection: &str) -> Result<u64, StoreError>;

    /// Create or fully replace a single document.
    async fn set(&self, doc_ref: DocRef, document: Document) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.set(doc_ref, document);
        self.commit(batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_preserves_order() {
        let mut batch = WriteBatch::new();
        batch
            .delete(DocRef::new("users", "giash_uid"))
            .delete(DocRef::new("users", "rina_uid"))
            .set(DocRef::new("pairs", "giash_rina_home"), Document::new());

        let targets: Vec<String> = batch.ops().iter().map(|op| op.target().to_string()).collect();
        assert_eq!(
            targets,
            ["users/giash_uid", "users/rina_uid", "pairs/giash_rina_home"]
        );
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_rejected_error_displays_backend_message() {
        let err = StoreError::Rejected {
            status: 403,
            message: "Missing or insufficient permissions.".to_string(),
        };
        assert_eq!(err.to_string(), "Missing or insufficient permissions.");
        assert!(!err.is_not_found());
    }
}
