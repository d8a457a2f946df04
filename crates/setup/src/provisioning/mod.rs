//! The reset-and-seed pipeline.
//!
//! ```text
//! Reset  → atomic delete of the demo ids (failure is logged, not fatal)
//! Seed   → users, then the pair, one full-replace write each
//! Verify → whole-collection counts of `users` and `pairs`
//! Report → SetupReport for the response body
//! ```
//!
//! Stages run strictly in sequence against any [`DocumentStore`].

pub mod encode;
pub mod report;
pub mod reset;
pub mod seed;
pub mod verify;

pub use report::{
    DemoSummary, DemoUser, METHOD_NOT_ALLOWED_MESSAGE, SETUP_HELP, SUCCESS_MESSAGE, SetupFailure,
    SetupReport, SetupResponse,
};
pub use reset::{ResetOutcome, reset, reset_batch};
pub use seed::seed;
pub use verify::{CollectionCounts, count_collections};

use chrono::{DateTime, Utc};
use shukku_core::DemoCatalog;
use tracing::instrument;

use crate::error::SetupError;
use crate::store::DocumentStore;

/// Provision the demo dataset into `store` and describe the result.
///
/// `project` is only echoed into the report. `now` anchors the item history.
///
/// # Errors
///
/// Returns `SetupError::Fixture` if the catalog is inconsistent,
/// `SetupError::Seed` if a write fails, and `SetupError::Verify` if the
/// collections cannot be counted. Reset failures are not errors.
#[instrument(skip(store, now))]
pub async fn run(
    store: &dyn DocumentStore,
    project: &str,
    now: DateTime<Utc>,
) -> Result<SetupReport, SetupError> {
    tracing::info!("Starting Shukku List database setup");

    let catalog = DemoCatalog::build(now)?;

    reset(store, &catalog).await;
    let written = seed(store, &catalog).await?;
    let counts = count_collections(store).await?;

    tracing::info!(written, "Setup completed successfully");
    Ok(SetupReport::new(project, &catalog, counts))
}
