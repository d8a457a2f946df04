//! Creation of the demo documents.
//!
//! Users are written first, then the pair, one document per commit. There is
//! no rollback: if the pair write fails the users stay behind.

use shukku_core::{DemoCatalog, Pair, User};
use tracing::instrument;

use super::encode::{pair_document, user_document};
use crate::error::SetupError;
use crate::store::{DocRef, Document, DocumentStore};

/// Write every demo document with full-replace semantics.
///
/// Returns the number of documents written.
///
/// # Errors
///
/// Returns `SetupError::Seed` naming the first document that failed.
#[instrument(skip_all)]
pub async fn seed(store: &dyn DocumentStore, catalog: &DemoCatalog) -> Result<usize, SetupError> {
    let mut written = 0;

    for user in catalog.users() {
        write(store, DocRef::new(User::COLLECTION, &user.uid), user_document(user)).await?;
        tracing::info!(uid = %user.uid, "Created user {} {}", user.avatar, user.name);
        written += 1;
    }

    let pair = catalog.pair();
    write(store, DocRef::new(Pair::COLLECTION, &pair.pair_id), pair_document(pair)).await?;
    tracing::info!(
        pair_id = %pair.pair_id,
        items = pair.items.len(),
        "Created list \"{}\"",
        pair.list_name
    );
    written += 1;

    Ok(written)
}

async fn write(
    store: &dyn DocumentStore,
    doc_ref: DocRef,
    document: Document,
) -> Result<(), SetupError> {
    let entity = doc_ref.to_string();
    store
        .set(doc_ref, document)
        .await
        .map_err(|source| SetupError::Seed { entity, source })
}
