//! Print the demo catalog.

use chrono::Utc;
use serde_json::json;
use shukku_core::DemoCatalog;

use super::{CommandError, print_json};

/// Print the users and pair as they would be built right now.
///
/// # Errors
///
/// Returns an error if the catalog is inconsistent or stdout is closed.
pub fn print() -> Result<(), CommandError> {
    let catalog = DemoCatalog::build(Utc::now())?;
    print_json(&json!({
        "users": catalog.users(),
        "pair": catalog.pair(),
    }))
}
