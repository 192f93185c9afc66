use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use postforge_cloud::CloudError;
use postforge_core::error::CoreError;
use postforge_pipeline::{PipelineError, StoreError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{ "error": ..., "code": ... }`
/// JSON bodies. Webhook failures and timeouts never reach this type; they
/// are reported as outcomes of a successful response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Identity provider or object storage failure outside a workflow.
    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

type Classified = (StatusCode, &'static str, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core(core),
            AppError::Pipeline(PipelineError::Core(core)) => classify_core(core),
            AppError::Pipeline(PipelineError::Persistence(err)) => classify_store(err),
            AppError::Pipeline(PipelineError::Cloud(err)) | AppError::Cloud(err) => {
                classify_cloud(err)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> Classified {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core(err: &CoreError) -> Classified {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Missing(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Persistence failures abort the operation and surface their message.
fn classify_store(err: &StoreError) -> Classified {
    tracing::error!(error = %err, "Persistence failure");
    let message = match err {
        StoreError::Database(sqlx::Error::Database(db_err)) => {
            format!("Failed to save: {}", db_err.message())
        }
        StoreError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => {
            "Failed to save: the database is unreachable".to_string()
        }
        StoreError::Database(_) => "Failed to save: database error".to_string(),
        StoreError::Backend(msg) => format!("Failed to save: {msg}"),
    };
    (StatusCode::BAD_GATEWAY, "PERSISTENCE_ERROR", message)
}

fn classify_cloud(err: &CloudError) -> Classified {
    match err {
        CloudError::Unavailable { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            err.to_string(),
        ),
        CloudError::Api { status, message } => {
            let status = StatusCode::from_u16(*status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY);
            (status, "BACKEND_ERROR", message.clone())
        }
        CloudError::InvalidResponse { .. } | CloudError::InvalidUrl(_) => {
            tracing::error!(error = %err, "Hosted backend misbehaved");
            (StatusCode::BAD_GATEWAY, "BACKEND_ERROR", err.to_string())
        }
    }
}
