//! HTTP route handlers for the setup service.
//!
//! # Route Structure
//!
//! ```text
//! GET     /api/setup   - Reset and reseed the demo dataset
//! OPTIONS /api/setup   - CORS preflight
//! *       /api/setup   - 405 with a JSON error body
//! GET     /health      - Liveness check
//! ```

pub mod setup;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the setup routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/setup",
            get(setup::run)
                .head(setup::method_not_allowed)
                .options(setup::preflight)
                .fallback(setup::method_not_allowed),
        )
        .route("/health", get(health))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not touch the database.
async fn health() -> &'static str {
    "ok"
}
