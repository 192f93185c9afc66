pub mod auth;
pub mod campaigns;
pub mod drafts;
pub mod health;
pub mod paid_content;
pub mod review;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                         sign up (public)
/// /auth/login                          sign in (public)
/// /auth/logout                         sign out
/// /auth/session                        current user
///
/// /drafts                              submit a brief (POST)
/// /drafts/test                         test invocation, persists nothing (POST)
/// /drafts/latest                       latest draft (GET)
/// /drafts/panel                        current result panel (GET)
/// /drafts/refresh                      explicit re-check (POST)
/// /drafts/assets                       multipart asset upload (POST)
///
/// /review/approve                      approve latest draft (POST)
/// /review/reject                       reject latest draft (POST)
///
/// /campaigns                           cached history with filters, create
/// /campaigns/search                    re-fetch history by name (POST)
/// /campaigns/{id}/toggle               expand or collapse a row (POST)
/// /campaigns/{id}/content              add platform content (POST)
/// /campaigns/{id}/status               update status (PUT)
///
/// /paid-content                        create + generate (POST)
/// /paid-content/{id}/save              save draft (POST)
/// /paid-content/{id}/regenerate        regenerate one field (POST)
/// ```
///
/// Every route except `/auth/signup` and `/auth/login` requires a bearer
/// access token (enforced by the `AuthUser` extractor).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/drafts", drafts::router())
        .nest("/review", review::router())
        .nest("/campaigns", campaigns::router())
        .nest("/paid-content", paid_content::router())
}
