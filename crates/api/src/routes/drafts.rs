use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::drafts;
use crate::state::AppState;

/// Routes mounted at `/drafts`.
///
/// ```text
/// POST /          -> submit
/// POST /test      -> test_invocation
/// GET  /latest    -> latest
/// GET  /panel     -> panel
/// POST /refresh   -> refresh
/// POST /assets    -> upload_asset (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(drafts::submit))
        .route("/test", post(drafts::test_invocation))
        .route("/latest", get(drafts::latest))
        .route("/panel", get(drafts::panel))
        .route("/refresh", post(drafts::refresh))
        .route(
            "/assets",
            post(drafts::upload_asset).layer(DefaultBodyLimit::max(drafts::MAX_ASSET_BYTES)),
        )
}
