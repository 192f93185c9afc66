//! The asset upload side-channel.

use std::sync::Arc;

use chrono::Utc;
use postforge_cloud::ObjectStore;
use postforge_core::content::{MediaKind, PostFormat};
use postforge_core::error::CoreError;
use postforge_core::types::DbId;
use postforge_core::upload::{storage_path, validate_asset_mime, ASSET_NAMESPACE};
use postforge_db::models::content_draft::ContentDraft;
use postforge_events::{event_types, EventBus, PlatformEvent};
use serde::Serialize;

use crate::error::PipelineError;
use crate::store::DraftStore;
use crate::Actor;

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedAsset {
    /// Public URL. Passed back in the brief when no draft was given.
    pub url: String,
    pub path: String,
    pub kind: MediaKind,
    /// The draft the asset was attached to, if any.
    pub draft: Option<ContentDraft>,
}

pub struct AssetUploadService {
    objects: Arc<dyn ObjectStore>,
    drafts: Arc<dyn DraftStore>,
    bus: Arc<EventBus>,
}

impl AssetUploadService {
    pub fn new(objects: Arc<dyn ObjectStore>, drafts: Arc<dyn DraftStore>, bus: Arc<EventBus>) -> Self {
        Self {
            objects,
            drafts,
            bus,
        }
    }

    /// Gate the file on the post format, store it under the caller's
    /// namespace, and attach its public URL to `draft_id` when given.
    ///
    /// A rejected MIME type fails before any storage call. An unknown or
    /// foreign `draft_id` fails after the object was stored.
    pub async fn upload(
        &self,
        actor: &Actor,
        access_token: &str,
        format: PostFormat,
        draft_id: Option<DbId>,
        file: AssetUpload,
    ) -> Result<UploadedAsset, PipelineError> {
        let kind = validate_asset_mime(format, &file.content_type)?;
        if file.bytes.is_empty() {
            return Err(CoreError::Validation("The selected file is empty".to_string()).into());
        }

        let path = storage_path(
            ASSET_NAMESPACE,
            actor.user_id,
            Utc::now().timestamp_millis(),
            &file.file_name,
        );
        let size = file.bytes.len();
        self.objects
            .upload(access_token, &path, &file.content_type, file.bytes)
            .await
            .inspect_err(|e| {
                tracing::warn!(user_id = %actor.user_id, %path, error = %e, "Asset upload failed");
            })?;
        let url = self.objects.public_url(&path)?;
        tracing::info!(user_id = %actor.user_id, %path, size, "Asset uploaded");

        let draft = match draft_id {
            Some(id) => {
                let row = self
                    .drafts
                    .attach_uploaded_media(actor.user_id, id, kind, &url)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "content_draft",
                        id,
                    })?;
                self.bus.publish(
                    PlatformEvent::new(event_types::DRAFT_ASSET_UPLOADED)
                        .with_source("content_draft", id)
                        .with_actor(actor.user_id)
                        .with_payload(serde_json::json!({ "kind": kind, "url": url })),
                );
                Some(row)
            }
            None => None,
        };

        Ok(UploadedAsset {
            url,
            path,
            kind,
            draft,
        })
    }
}
