//! In-process document store.
//!
//! Used for `--dry-run` provisioning and in tests. Batches are applied under
//! a single write lock, so they are atomic with respect to every other
//! caller of the same store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{DocRef, Document, DocumentStore, StoreError, WriteBatch, WriteOp};

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

/// A [`DocumentStore`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<Collections>,
    operations: AtomicUsize,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls (commits, reads, counts) made so far.
    #[must_use]
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Every document id in `collection`, sorted.
    pub async fn ids(&self, collection: &str) -> Vec<String> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Insert a document directly, without counting it as an operation.
    ///
    /// Handy for arranging pre-existing data.
    pub async fn insert(&self, doc_ref: DocRef, document: Document) {
        self.collections
            .write()
            .await
            .entry(doc_ref.collection)
            .or_default()
            .insert(doc_ref.id, document);
    }

    fn record(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.record();
        let commit_time = Utc::now();
        let mut collections = self.collections.write().await;

        for op in batch {
            match op {
                WriteOp::Set(doc_ref, mut document) => {
                    document.resolve_server_time(commit_time);
                    collections
                        .entry(doc_ref.collection)
                        .or_default()
                        .insert(doc_ref.id, document);
                }
                WriteOp::Delete(doc_ref) => {
                    if let Some(docs) = collections.get_mut(&doc_ref.collection) {
                        docs.remove(&doc_ref.id);
                        if docs.is_empty() {
                            collections.remove(&doc_ref.collection);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn get(&self, doc_ref: &DocRef) -> Result<Option<Document>, StoreError> {
        self.record();
        Ok(self
            .collections
            .read()
            .await
            .get(&doc_ref.collection)
            .and_then(|docs| docs.get(&doc_ref.id))
            .cloned())
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.record();
        let len = self
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len);
        Ok(u64::try_from(len).unwrap_or(u64::MAX))
    }
}
