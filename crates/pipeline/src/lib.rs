//! Async workflows of the content workspace.
//!
//! Each service owns one user-facing flow and talks to the outside world
//! only through the seams in [`store`] (row storage), [`hooks`] (automation
//! webhooks) and [`postforge_cloud::ObjectStore`] (object storage), so the
//! workflows can be driven by in-memory fakes in tests.
//!
//! - [`generation::GenerationPipeline`]: draft submission, the webhook race,
//!   late writes, the per-user result panel.
//! - [`upload::AssetUploadService`]: the asset upload side-channel.
//! - [`approval::ApprovalService`]: approve / reject the latest draft.
//! - [`history::HistoryService`]: campaign history listing and edits.
//! - [`paid::PaidContentService`]: paid-ad briefs and templated content.

pub mod approval;
pub mod background;
pub mod error;
pub mod generation;
pub mod history;
pub mod hooks;
pub mod paid;
pub mod store;
pub mod upload;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use background::BackgroundTasks;
pub use error::{PipelineError, StoreError};

use postforge_core::types::UserId;

/// The authenticated caller of a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub email: String,
}
