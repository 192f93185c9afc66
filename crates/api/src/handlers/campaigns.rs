//! Handlers for the `/campaigns` resource (content history).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use postforge_core::history::HistoryFilter;
use postforge_core::types::DbId;
use postforge_db::models::campaign::{
    Campaign, CampaignContent, CreateCampaign, CreateCampaignContent,
};
use postforge_pipeline::history::HistoryPage;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Filter query parameters shared by the history endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// An exact status tag, or `all`.
    pub status: Option<String>,
}

impl From<HistoryQuery> for HistoryFilter {
    fn from(q: HistoryQuery) -> Self {
        Self {
            start_date: q.start_date,
            end_date: q.end_date,
            status: q.status,
        }
    }
}

/// Body for `POST /campaigns/search`. A blank or missing term refreshes
/// the full history.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// GET /api/v1/campaigns
///
/// Filters the caller's last fetched set; fetches only on first use.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<DataResponse<HistoryPage>>> {
    let page = state.history.list(&user.actor(), &params.into()).await?;
    Ok(DataResponse::new(page))
}

/// POST /api/v1/campaigns/search
pub async fn search(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HistoryQuery>,
    Json(input): Json<SearchRequest>,
) -> AppResult<Json<DataResponse<HistoryPage>>> {
    let page = state
        .history
        .search(&user.actor(), input.search.as_deref(), &params.into())
        .await?;
    Ok(DataResponse::new(page))
}

/// POST /api/v1/campaigns/{id}/toggle
pub async fn toggle(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<DataResponse<HistoryPage>>> {
    let page = state
        .history
        .toggle_expanded(&user.actor(), id, &params.into())?;
    Ok(DataResponse::new(page))
}

/// POST /api/v1/campaigns
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateCampaign>,
) -> AppResult<(StatusCode, Json<DataResponse<Campaign>>)> {
    let campaign = state.history.create_campaign(&user.actor(), input).await?;
    Ok((StatusCode::CREATED, DataResponse::new(campaign)))
}

/// POST /api/v1/campaigns/{id}/content
pub async fn add_content(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreateCampaignContent>,
) -> AppResult<(StatusCode, Json<DataResponse<CampaignContent>>)> {
    let content = state.history.add_content(&user.actor(), id, input).await?;
    Ok((StatusCode::CREATED, DataResponse::new(content)))
}

/// PUT /api/v1/campaigns/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let campaign = state
        .history
        .update_status(&user.actor(), id, &input.status)
        .await?;
    Ok(DataResponse::new(campaign))
}
