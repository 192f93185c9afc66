//! Handlers for the `/drafts` resource: submission, the result panel, and
//! the asset upload side-channel.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use postforge_core::brief::ContentBrief;
use postforge_core::content::PostFormat;
use postforge_core::types::DbId;
use postforge_db::models::content_draft::ContentDraft;
use postforge_pipeline::generation::{PanelView, SubmissionReport};
use postforge_pipeline::upload::{AssetUpload, UploadedAsset};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Largest accepted asset upload.
pub const MAX_ASSET_BYTES: usize = 100 * 1024 * 1024;

/// POST /api/v1/drafts
///
/// Blocks until the generation webhook answers or the generation timeout
/// elapses. A timed-out or failed webhook is a `200` whose `outcome` says so.
pub async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(brief): Json<ContentBrief>,
) -> AppResult<Json<DataResponse<SubmissionReport>>> {
    let report = state.generation.submit(&user.actor(), &brief).await?;
    Ok(DataResponse::new(report))
}

/// POST /api/v1/drafts/test
///
/// Fire the webhook without creating a draft.
pub async fn test_invocation(
    State(state): State<AppState>,
    user: AuthUser,
    Json(brief): Json<ContentBrief>,
) -> AppResult<Json<DataResponse<SubmissionReport>>> {
    let report = state.generation.test_invocation(&user.actor(), &brief).await?;
    Ok(DataResponse::new(report))
}

/// GET /api/v1/drafts/latest
///
/// `data` is `null` when the caller has no drafts yet.
pub async fn latest(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Option<ContentDraft>>>> {
    let draft = state.approvals.latest(&user.actor()).await?;
    Ok(DataResponse::new(draft))
}

/// GET /api/v1/drafts/panel
pub async fn panel(State(state): State<AppState>, user: AuthUser) -> Json<DataResponse<PanelView>> {
    DataResponse::new(state.generation.panel(user.user_id))
}

/// POST /api/v1/drafts/refresh
///
/// Explicit re-check of the latest draft. The only way a timed-out panel
/// picks up a late write.
pub async fn refresh(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<PanelView>>> {
    let view = state.generation.refresh(user.user_id).await?;
    Ok(DataResponse::new(view))
}

/// POST /api/v1/drafts/assets
///
/// Multipart fields: `file` (required), `format` (required, format label),
/// `draft_id` (optional, attaches the uploaded URL to that draft).
pub async fn upload_asset(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadedAsset>>)> {
    let mut file: Option<AssetUpload> = None;
    let mut format: Option<PostFormat> = None;
    let mut draft_id: Option<DbId> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some(AssetUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "format" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                format = Some(text.parse()?);
            }
            "draft_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !text.trim().is_empty() {
                    draft_id = Some(text.trim().parse().map_err(|_| {
                        AppError::BadRequest(format!("Invalid draft_id '{text}'"))
                    })?);
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let format =
        format.ok_or_else(|| AppError::BadRequest("Missing required 'format' field".into()))?;

    let asset = state
        .uploads
        .upload(&user.actor(), &user.access_token, format, draft_id, file)
        .await?;
    Ok((StatusCode::CREATED, DataResponse::new(asset)))
}
