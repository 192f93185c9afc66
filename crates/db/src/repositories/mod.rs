//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every read and write is
//! filtered by the caller-supplied owner id where the table has one.

pub mod campaign_repo;
pub mod content_draft_repo;
pub mod paid_content_repo;

pub use campaign_repo::CampaignRepo;
pub use content_draft_repo::ContentDraftRepo;
pub use paid_content_repo::PaidContentRepo;
