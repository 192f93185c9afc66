//! Approve or reject the caller's latest draft.

use std::sync::Arc;

use chrono::Utc;
use postforge_core::approval::{Decision, Redirect};
use postforge_core::error::CoreError;
use postforge_core::panel::MediaView;
use postforge_core::types::DbId;
use postforge_db::models::content_draft::ContentDraft;
use postforge_events::{event_types, ApprovalPayload, EventBus, PlatformEvent};
use serde::Serialize;

use crate::background::BackgroundTasks;
use crate::error::PipelineError;
use crate::hooks::ApprovalHook;
use crate::store::DraftStore;
use crate::Actor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionReport {
    pub draft_id: DbId,
    pub status: &'static str,
    pub message: &'static str,
    pub redirect: Redirect,
}

pub struct ApprovalService {
    drafts: Arc<dyn DraftStore>,
    hook: Arc<dyn ApprovalHook>,
    bus: Arc<EventBus>,
    background: BackgroundTasks,
    redirect_delay_ms: u64,
}

impl ApprovalService {
    pub fn new(
        drafts: Arc<dyn DraftStore>,
        hook: Arc<dyn ApprovalHook>,
        bus: Arc<EventBus>,
        background: BackgroundTasks,
        redirect_delay_ms: u64,
    ) -> Self {
        Self {
            drafts,
            hook,
            bus,
            background,
            redirect_delay_ms,
        }
    }

    /// The latest draft, as shown on the review page.
    pub async fn latest(&self, actor: &Actor) -> Result<Option<ContentDraft>, PipelineError> {
        Ok(self.drafts.find_latest(actor.user_id).await?)
    }

    /// Mark the latest draft approved, then notify the approval automation
    /// in the background.
    pub async fn approve(&self, actor: &Actor) -> Result<DecisionReport, PipelineError> {
        let draft = self.decide(actor, Decision::Approve).await?;

        let payload = approval_payload(actor, &draft);
        let hook = self.hook.clone();
        self.background.spawn("approval_webhook", async move {
            match hook.notify_approved(&payload).await {
                Ok(()) => tracing::info!(draft_id = %payload.draft_id, "Approval webhook notified"),
                Err(e) => tracing::warn!(
                    draft_id = %payload.draft_id,
                    error = %e,
                    "Approval webhook failed; approval stands",
                ),
            }
        });

        Ok(self.report(draft.id, Decision::Approve))
    }

    /// Mark the latest draft rejected. No automation is notified.
    pub async fn reject(&self, actor: &Actor) -> Result<DecisionReport, PipelineError> {
        let draft = self.decide(actor, Decision::Reject).await?;
        Ok(self.report(draft.id, Decision::Reject))
    }

    async fn decide(&self, actor: &Actor, decision: Decision) -> Result<ContentDraft, PipelineError> {
        let mut draft = self
            .drafts
            .find_latest(actor.user_id)
            .await?
            .ok_or(CoreError::Missing("draft"))?;

        let status = decision.status();
        if !self.drafts.set_status(actor.user_id, draft.id, status).await? {
            return Err(CoreError::NotFound {
                entity: "content_draft",
                id: draft.id,
            }
            .into());
        }
        draft.status = status.to_string();

        tracing::info!(draft_id = %draft.id, user_id = %actor.user_id, status, "Draft decision recorded");
        let event_type = match decision {
            Decision::Approve => event_types::DRAFT_APPROVED,
            Decision::Reject => event_types::DRAFT_REJECTED,
        };
        self.bus.publish(
            PlatformEvent::new(event_type)
                .with_source("content_draft", draft.id)
                .with_actor(actor.user_id),
        );
        Ok(draft)
    }

    fn report(&self, draft_id: DbId, decision: Decision) -> DecisionReport {
        DecisionReport {
            draft_id,
            status: decision.status(),
            message: decision.success_message(),
            redirect: Redirect::after_decision(self.redirect_delay_ms),
        }
    }
}

fn approval_payload(actor: &Actor, draft: &ContentDraft) -> ApprovalPayload {
    let media = MediaView::from_outputs(&draft.outputs());
    ApprovalPayload {
        draft_id: draft.id,
        user_id: actor.user_id,
        email: actor.email.clone(),
        status: draft.status.clone(),
        platform: draft.platform.clone(),
        content_text: media.text,
        image_url: media.image.map(|m| m.url),
        video_url: media.video.map(|m| m.url),
        approved_at: Utc::now(),
    }
}
