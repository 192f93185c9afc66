//! The `{ "data": ... }` response envelope.

use serde::Serialize;

/// Standard success envelope. Errors use `{ "error", "code" }` instead
/// (see [`crate::error::AppError`]).
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> axum::Json<Self> {
        axum::Json(Self { data })
    }
}
