//! Handlers for the `/paid-content` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use postforge_core::paid::{AdField, PaidContentForm};
use postforge_core::types::DbId;
use postforge_db::models::paid_content::PaidContent;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    pub field: AdField,
}

/// POST /api/v1/paid-content
///
/// Persists the brief and returns it with generated ad content.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(form): Json<PaidContentForm>,
) -> AppResult<(StatusCode, Json<DataResponse<PaidContent>>)> {
    let row = state.paid_content.create(&user.actor(), &form).await?;
    Ok((StatusCode::CREATED, DataResponse::new(row)))
}

/// POST /api/v1/paid-content/{id}/save
pub async fn save(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PaidContent>>> {
    let row = state.paid_content.save_draft(&user.actor(), id).await?;
    Ok(DataResponse::new(row))
}

/// POST /api/v1/paid-content/{id}/regenerate
pub async fn regenerate(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RegenerateRequest>,
) -> AppResult<Json<DataResponse<PaidContent>>> {
    let row = state
        .paid_content
        .regenerate(&user.actor(), id, input.field)
        .await?;
    Ok(DataResponse::new(row))
}
