//! Content draft rows (the blueprint / review flows).

use postforge_core::content::{MediaKind, PostFormat};
use postforge_core::panel::DraftOutputs;
use postforge_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `content_drafts` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ContentDraft {
    pub id: DbId,
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub idea: String,
    pub platform: String,
    pub format: String,
    pub asset_source: Option<String>,
    pub knowledge_base_file_name: Option<String>,
    pub asset_file_name: Option<String>,
    pub status: String,
    pub generated_text: Option<String>,
    pub generated_image_url: Option<String>,
    pub generated_video_url: Option<String>,
    pub uploaded_image_url: Option<String>,
    pub uploaded_video_url: Option<String>,
    pub media_ready: bool,
    pub generated_at: Option<Timestamp>,
}

impl ContentDraft {
    /// Output columns, for building the result panel.
    pub fn outputs(&self) -> DraftOutputs {
        DraftOutputs {
            generated_text: self.generated_text.clone(),
            generated_image_url: self.generated_image_url.clone(),
            generated_video_url: self.generated_video_url.clone(),
            uploaded_image_url: self.uploaded_image_url.clone(),
            uploaded_video_url: self.uploaded_video_url.clone(),
            media_ready: self.media_ready,
        }
    }

    /// The stored format label parsed back, if it is still a known label.
    pub fn post_format(&self) -> Option<PostFormat> {
        self.format.parse().ok()
    }
}

/// DTO for inserting a new draft. Status always starts at `draft_created`.
#[derive(Debug, Clone, Default)]
pub struct CreateContentDraft {
    pub user_id: UserId,
    pub idea: String,
    pub platform: String,
    pub format: String,
    pub asset_source: Option<String>,
    pub knowledge_base_file_name: Option<String>,
    pub asset_file_name: Option<String>,
    pub uploaded_image_url: Option<String>,
    pub uploaded_video_url: Option<String>,
}

/// Output columns written by the generation webhook handler. `None` leaves
/// the stored column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordGeneratedContent {
    pub generated_text: Option<String>,
    pub generated_image_url: Option<String>,
    pub generated_video_url: Option<String>,
    pub mark_media_ready: bool,
}

/// Which uploaded-media column an asset lands in.
pub fn uploaded_column(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "uploaded_image_url",
        MediaKind::Video => "uploaded_video_url",
    }
}
