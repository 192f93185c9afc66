use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// GET  /               -> list (?start_date, end_date, status)
/// POST /               -> create
/// POST /search         -> search (re-fetch; blank term refreshes)
/// POST /{id}/toggle    -> toggle (expand or collapse a cached row)
/// POST /{id}/content   -> add_content
/// PUT  /{id}/status    -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaigns::list).post(campaigns::create))
        .route("/search", post(campaigns::search))
        .route("/{id}/toggle", post(campaigns::toggle))
        .route("/{id}/content", post(campaigns::add_content))
        .route("/{id}/status", put(campaigns::update_status))
}
