//! Handlers for the `/review` resource: decisions on the latest draft.

use axum::extract::State;
use axum::Json;
use postforge_pipeline::approval::DecisionReport;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/review/approve
///
/// The approval webhook is notified in the background after the write.
pub async fn approve(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<DecisionReport>>> {
    let report = state.approvals.approve(&user.actor()).await?;
    Ok(DataResponse::new(report))
}

/// POST /api/v1/review/reject
pub async fn reject(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<DecisionReport>>> {
    let report = state.approvals.reject(&user.actor()).await?;
    Ok(DataResponse::new(report))
}
