//! Unified error handling with Sentry integration.
//!
//! Every failure that reaches the caller becomes the same `500` body:
//! `{"success": false, "error": <message>, "help": <setup checklist>}`.
//! Only the message differs between a missing credential and a failed write.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shukku_core::FixtureError;
use thiserror::Error;

use crate::firestore::CredentialError;
use crate::provisioning::{SetupFailure, SetupResponse};
use crate::store::StoreError;

/// Fatal provisioning errors.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The service account is missing or unusable.
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// The demo catalog broke one of its invariants.
    #[error("Invalid demo catalog: {0}")]
    Fixture(#[from] FixtureError),

    /// The database client could not be created.
    #[error("Could not initialize Firestore: {0}")]
    StoreInit(#[source] StoreError),

    /// Writing a fixture document failed. Earlier writes stay in place.
    #[error("{source}")]
    Seed {
        /// `collection/id` of the document that failed
        entity: String,
        source: StoreError,
    },

    /// Counting collections after the seed failed.
    #[error("{0}")]
    Verify(#[source] StoreError),
}

impl IntoResponse for SetupError {
    fn into_response(self) -> Response {
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Setup failed"
        );

        let body = SetupResponse::Failure(SetupFailure::with_help(self.to_string()));
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Result type alias for `SetupError`.
pub type Result<T> = std::result::Result<T, SetupError>;
