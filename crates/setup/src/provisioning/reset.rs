//! Removal of the previous demo documents.
//!
//! The delete batch is committed atomically. A failed reset never stops the
//! run: seeding overwrites the same identifiers anyway.

use shukku_core::{DemoCatalog, Pair, User};
use tracing::instrument;

use crate::store::{DocRef, DocumentStore, WriteBatch};

/// What the reset stage did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The delete batch committed. Missing documents count as deleted.
    Cleared {
        /// Number of documents targeted
        documents: usize,
    },
    /// The batch failed and nothing is known to have been removed.
    Skipped {
        /// Store error message
        reason: String,
    },
}

impl ResetOutcome {
    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        matches!(self, Self::Cleared { .. })
    }
}

/// One delete per demo user and pair, in catalog order.
#[must_use]
pub fn reset_batch(catalog: &DemoCatalog) -> WriteBatch {
    let mut batch = WriteBatch::new();
    for uid in catalog.user_ids() {
        batch.delete(DocRef::new(User::COLLECTION, uid));
    }
    for pair_id in catalog.pair_ids() {
        batch.delete(DocRef::new(Pair::COLLECTION, pair_id));
    }
    batch
}

/// Delete every demo document in one atomic commit.
#[instrument(skip_all)]
pub async fn reset(store: &dyn DocumentStore, catalog: &DemoCatalog) -> ResetOutcome {
    let batch = reset_batch(catalog);
    let documents = batch.len();

    match store.commit(batch).await {
        Ok(()) => {
            tracing::info!(documents, "Cleared previous demo data");
            ResetOutcome::Cleared { documents }
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                not_found = e.is_not_found(),
                "Reset failed, continuing with seed"
            );
            ResetOutcome::Skipped {
                reason: e.to_string(),
            }
        }
    }
}
