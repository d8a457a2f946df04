//! CLI command implementations.

pub mod fixture;
pub mod setup;

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use shukku_setup::config::{ConfigError, SetupConfig};
use shukku_setup::error::SetupError;
use shukku_setup::firestore::{CredentialError, FirestoreClient, ServiceAccount};
use shukku_setup::store::{DocumentStore, StoreError};
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Fixture(#[from] shukku_core::FixtureError),

    #[error("reset did not complete: {0}")]
    ResetSkipped(String),

    #[error("could not write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("could not encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// A Firestore-backed store plus the project it targets.
struct Connection {
    store: Arc<dyn DocumentStore>,
    project: String,
}

/// Load configuration and connect to Firestore (or the emulator).
fn connect() -> Result<Connection, CommandError> {
    let config = SetupConfig::from_env()?;
    let account = ServiceAccount::from_blob(config.service_account.as_ref())?;
    let client = FirestoreClient::new(account, &config.firestore)?;

    tracing::info!(project = %client.project_id(), "Connected to Firestore");
    Ok(Connection {
        project: client.project_id().to_string(),
        store: Arc::new(client),
    })
}

/// Pretty-print `value` as JSON on stdout.
fn print_json(value: &impl Serialize) -> Result<(), CommandError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
