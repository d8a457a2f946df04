//! Post-seed sanity counts.

use serde::Serialize;
use shukku_core::{Pair, User};
use tracing::instrument;

use crate::error::SetupError;
use crate::store::DocumentStore;

/// Size of each collection after the seed.
///
/// These are whole-collection counts and include any non-demo documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionCounts {
    pub users: u64,
    pub pairs: u64,
}

/// Count the `users` and `pairs` collections.
///
/// # Errors
///
/// Returns `SetupError::Verify` if either count fails.
#[instrument(skip(store))]
pub async fn count_collections(store: &dyn DocumentStore) -> Result<CollectionCounts, SetupError> {
    let users = store
        .count(User::COLLECTION)
        .await
        .map_err(SetupError::Verify)?;
    let pairs = store
        .count(Pair::COLLECTION)
        .await
        .map_err(SetupError::Verify)?;

    tracing::info!(users, pairs, "Verified collection sizes");
    Ok(CollectionCounts { users, pairs })
}
