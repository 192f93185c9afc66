use axum::routing::post;
use axum::Router;

use crate::handlers::paid_content;
use crate::state::AppState;

/// Routes mounted at `/paid-content`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(paid_content::create))
        .route("/{id}/save", post(paid_content::save))
        .route("/{id}/regenerate", post(paid_content::regenerate))
}
