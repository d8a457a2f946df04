//! Run the provisioning pipeline, or single stages of it.

use std::sync::Arc;

use chrono::Utc;
use shukku_core::DemoCatalog;
use shukku_setup::config::SetupConfig;
use shukku_setup::firestore::ServiceAccount;
use shukku_setup::provisioning::{self, ResetOutcome, SetupFailure, SetupResponse};
use shukku_setup::store::{DocumentStore, InMemoryStore};
use tracing::info;

use super::{CommandError, Connection, connect, print_json};

/// Project name reported by dry runs without a usable service account.
const DRY_RUN_PROJECT: &str = "dry-run";

/// Reset, seed, verify and print the report.
///
/// # Errors
///
/// Returns an error if configuration is invalid or a fatal stage fails. The
/// failure body is printed before returning.
pub async fn run(dry_run: bool) -> Result<(), CommandError> {
    let Connection { store, project } = if dry_run {
        dry_run_connection()?
    } else {
        connect()?
    };

    match provisioning::run(store.as_ref(), &project, Utc::now()).await {
        Ok(report) => print_json(&SetupResponse::Success {
            data: report,
            timestamp: Utc::now(),
        }),
        Err(e) => {
            print_json(&SetupResponse::Failure(SetupFailure::with_help(e.to_string())))?;
            Err(e.into())
        }
    }
}

/// Delete the demo documents only.
///
/// # Errors
///
/// Returns `CommandError::ResetSkipped` if the delete batch failed.
pub async fn reset() -> Result<(), CommandError> {
    let Connection { store, .. } = connect()?;
    let catalog = DemoCatalog::build(Utc::now())?;

    match provisioning::reset(store.as_ref(), &catalog).await {
        ResetOutcome::Cleared { documents } => {
            info!(documents, "Demo documents deleted");
            Ok(())
        }
        ResetOutcome::Skipped { reason } => Err(CommandError::ResetSkipped(reason)),
    }
}

/// Print the size of the `users` and `pairs` collections.
///
/// # Errors
///
/// Returns an error if either count fails.
pub async fn counts() -> Result<(), CommandError> {
    let Connection { store, .. } = connect()?;
    let counts = provisioning::count_collections(store.as_ref()).await?;
    print_json(&counts)
}

/// An empty in-memory store, labelled with the configured project if any.
fn dry_run_connection() -> Result<Connection, CommandError> {
    let config = SetupConfig::from_env()?;
    let project = ServiceAccount::from_blob(config.service_account.as_ref()).map_or_else(
        |_| DRY_RUN_PROJECT.to_string(),
        |account| account.project_id,
    );

    info!(%project, "Dry run against an in-memory store");
    Ok(Connection {
        store: Arc::new(InMemoryStore::new()) as Arc<dyn DocumentStore>,
        project,
    })
}
