use postforge_cloud::CloudError;
use postforge_core::error::CoreError;

/// Row storage failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A non-Postgres backend refused the operation.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Error type shared by every workflow.
///
/// Webhook failures and timeouts are outcomes, not errors; they never
/// surface here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Validation, conflict, or not-found from the domain layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Row storage rejected a read or write. The operation was aborted.
    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),

    /// Identity provider or object storage failure.
    #[error(transparent)]
    Cloud(#[from] CloudError),
}
