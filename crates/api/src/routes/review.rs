use axum::routing::post;
use axum::Router;

use crate::handlers::review;
use crate::state::AppState;

/// Routes mounted at `/review`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/approve", post(review::approve))
        .route("/reject", post(review::reject))
}
