//! Shukku List CLI - demo provisioning without the HTTP endpoint.
//!
//! # Usage
//!
//! ```bash
//! # Reset and reseed the demo data in Firestore
//! shukku setup
//!
//! # Run the whole pipeline against an in-memory store
//! shukku setup --dry-run
//!
//! # Only delete the demo documents
//! shukku reset
//!
//! # Count the users and pairs collections
//! shukku counts
//!
//! # Print the demo catalog
//! shukku fixture
//! ```
//!
//! Reads the same environment as the server (`FIREBASE_SERVICE_ACCOUNT`,
//! `FIRESTORE_EMULATOR_HOST`, `FIRESTORE_DATABASE`), including `.env`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shukku")]
#[command(author, version, about = "Shukku List CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset and reseed the demo dataset, then print the report
    Setup {
        /// Run against an in-memory store instead of Firestore
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete the demo users and pair
    Reset,
    /// Print the number of documents in `users` and `pairs`
    Counts,
    /// Print the demo catalog as JSON
    Fixture,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shukku_setup=info,shukku=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Setup { dry_run } => commands::setup::run(dry_run).await,
        Commands::Reset => commands::setup::reset().await,
        Commands::Counts => commands::setup::counts().await,
        Commands::Fixture => commands::fixture::print(),
    }
}
