//! The one-click setup endpoint.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::error::Result;
use crate::firestore::ServiceAccount;
use crate::provisioning::{self, SetupFailure, SetupResponse};
use crate::state::AppState;

/// `GET /api/setup`: reset and reseed the demo data.
///
/// Credentials are checked before the store is touched, so a missing
/// service account costs no database traffic.
pub async fn run(State(state): State<AppState>) -> Result<Json<SetupResponse>> {
    let account = ServiceAccount::from_blob(state.config().service_account.as_ref())?;
    let store = state.store(&account).await?;

    let report = provisioning::run(store.as_ref(), &account.project_id, Utc::now()).await?;

    Ok(Json(SetupResponse::Success {
        data: report,
        timestamp: Utc::now(),
    }))
}

/// `OPTIONS /api/setup`: CORS preflight, empty `200`.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method.
pub async fn method_not_allowed() -> (StatusCode, Json<SetupResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(SetupResponse::Failure(SetupFailure::method_not_allowed())),
    )
}
