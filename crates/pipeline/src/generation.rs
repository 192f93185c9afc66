//! Draft submission and the generation webhook race.
//!
//! A submission validates the brief, persists a `draft_created` row, then
//! races the generation webhook against a fixed timeout:
//!
//! - webhook first: the body is parsed with the [`ResponseContract`] and any
//!   extracted output is written to the draft (`content_generated`);
//! - timer first: the attempt settles as timed out. The webhook call is NOT
//!   aborted. A tracked continuation waits for it and writes whatever it
//!   returns onto the draft ("late write"), publishing
//!   [`event_types::DRAFT_LATE_CONTENT`]. The displayed panel stays timed out
//!   until the user explicitly refreshes.
//!
//! Only process shutdown cancels a pending late write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use postforge_core::brief::{ContentBrief, ValidatedBrief};
use postforge_core::content::{MediaKind, PostFormat};
use postforge_core::contract::{extract_content, ExtractedContent, ResponseContract};
use postforge_core::error::CoreError;
use postforge_core::panel::{
    AttemptId, AttemptResult, DraftOutputs, GenerationSession, MediaView, Notice, ResultPanel,
};
use postforge_core::types::{DbId, Timestamp, UserId};
use postforge_db::models::content_draft::{CreateContentDraft, RecordGeneratedContent};
use postforge_events::{event_types, EventBus, GenerationPayload, PlatformEvent, WebhookError};
use serde::Serialize;
use tokio::task::{JoinError, JoinHandle};

use crate::background::BackgroundTasks;
use crate::error::PipelineError;
use crate::hooks::GenerationHook;
use crate::store::DraftStore;
use crate::Actor;

/// How long a submission waits for the webhook before settling as timed out.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

const CANCELLED_MESSAGE: &str = "The generation request was cancelled before it finished.";

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub timeout: Duration,
    pub contract: ResponseContract,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_GENERATION_TIMEOUT,
            contract: ResponseContract::v1(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How a submission or test invocation ended. `draft_id` is `None` for
/// test invocations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Generated {
        draft_id: Option<DbId>,
        content: ExtractedContent,
        media: MediaView,
    },
    /// The webhook answered but nothing usable was extracted.
    NoContent { draft_id: Option<DbId> },
    /// The timer won; the job may still complete upstream.
    TimedOut { draft_id: Option<DbId> },
    /// Transport, status, or parse failure; the job did not run.
    WebhookFailed {
        draft_id: Option<DbId>,
        reason: String,
    },
}

impl SubmissionOutcome {
    pub fn draft_id(&self) -> Option<DbId> {
        match self {
            SubmissionOutcome::Generated { draft_id, .. }
            | SubmissionOutcome::NoContent { draft_id }
            | SubmissionOutcome::TimedOut { draft_id }
            | SubmissionOutcome::WebhookFailed { draft_id, .. } => *draft_id,
        }
    }

    fn attempt_result(&self) -> AttemptResult {
        match self {
            SubmissionOutcome::Generated {
                draft_id, media, ..
            } => AttemptResult::Generated {
                draft_id: *draft_id,
                media: media.clone(),
            },
            SubmissionOutcome::NoContent { .. } => AttemptResult::NoContent,
            SubmissionOutcome::TimedOut { draft_id } => AttemptResult::TimedOut {
                draft_id: *draft_id,
            },
            SubmissionOutcome::WebhookFailed { reason, .. } => AttemptResult::WebhookFailed {
                reason: reason.clone(),
            },
        }
    }
}

/// The result panel as the client renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub panel: ResultPanel,
    pub notice: Option<Notice>,
    pub message: Option<String>,
    pub in_flight: bool,
}

impl PanelView {
    fn of(session: &GenerationSession) -> Self {
        Self {
            panel: session.panel().clone(),
            notice: session.notice().cloned(),
            message: session.notice().map(Notice::message),
            in_flight: session.in_flight(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReport {
    #[serde(flatten)]
    pub outcome: SubmissionOutcome,
    #[serde(flatten)]
    pub view: PanelView,
}

// ---------------------------------------------------------------------------
// Session registry
// ---------------------------------------------------------------------------

/// Per-user [`GenerationSession`]s.
#[derive(Default)]
struct SessionRegistry {
    sessions: Mutex<HashMap<UserId, GenerationSession>>,
}

impl SessionRegistry {
    fn with<R>(&self, user_id: UserId, f: impl FnOnce(&mut GenerationSession) -> R) -> R {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        f(sessions.entry(user_id).or_default())
    }
}

/// Holds a user's in-flight slot. Dropping it unsettled (the request future
/// was dropped mid-flight) releases the slot with an error notice.
struct AttemptGuard {
    registry: Arc<SessionRegistry>,
    user_id: UserId,
    attempt: AttemptId,
    settled: bool,
}

impl AttemptGuard {
    fn settle(mut self, result: AttemptResult) -> PanelView {
        self.settled = true;
        let attempt = self.attempt;
        self.registry.with(self.user_id, |s| {
            s.finish(attempt, result);
            PanelView::of(s)
        })
    }

    fn fail(self, err: PipelineError) -> PipelineError {
        self.settle(AttemptResult::Failed {
            message: err.to_string(),
        });
        err
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        if !self.settled {
            let attempt = self.attempt;
            self.registry.with(self.user_id, |s| {
                s.finish(
                    attempt,
                    AttemptResult::Failed {
                        message: CANCELLED_MESSAGE.to_string(),
                    },
                );
            });
        }
    }
}

/// Aborts the webhook task if the owning continuation is dropped at
/// shutdown.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

enum Race {
    Settled(Result<String, String>),
    TimedOut(JoinHandle<Result<String, WebhookError>>),
}

fn joined(result: Result<Result<String, WebhookError>, JoinError>) -> Result<String, String> {
    match result {
        Ok(Ok(body)) => Ok(body),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("Webhook task failed: {e}")),
    }
}

// ---------------------------------------------------------------------------
// GenerationPipeline
// ---------------------------------------------------------------------------

pub struct GenerationPipeline {
    drafts: Arc<dyn DraftStore>,
    hook: Arc<dyn GenerationHook>,
    bus: Arc<EventBus>,
    background: BackgroundTasks,
    contract: Arc<ResponseContract>,
    timeout: Duration,
    sessions: Arc<SessionRegistry>,
}

impl GenerationPipeline {
    pub fn new(
        drafts: Arc<dyn DraftStore>,
        hook: Arc<dyn GenerationHook>,
        bus: Arc<EventBus>,
        background: BackgroundTasks,
        config: GenerationConfig,
    ) -> Self {
        Self {
            drafts,
            hook,
            bus,
            background,
            contract: Arc::new(config.contract),
            timeout: config.timeout,
            sessions: Arc::default(),
        }
    }

    /// Submit a brief: validate, persist, race the webhook, write output.
    ///
    /// Fails with a validation error before any I/O, with a conflict while
    /// another attempt of the same user is in flight, and with a
    /// persistence error when the draft cannot be created or updated.
    /// Webhook failure and timeout are reported as outcomes.
    pub async fn submit(
        &self,
        actor: &Actor,
        brief: &ContentBrief,
    ) -> Result<SubmissionReport, PipelineError> {
        let brief = brief.validate()?;
        let guard = self.begin(actor.user_id)?;

        let draft = match self.drafts.create(&new_draft(actor.user_id, &brief)).await {
            Ok(draft) => draft,
            Err(e) => {
                tracing::error!(user_id = %actor.user_id, error = %e, "Failed to persist draft");
                return Err(guard.fail(e.into()));
            }
        };
        tracing::info!(
            draft_id = %draft.id,
            user_id = %actor.user_id,
            platform = %brief.platform,
            format = %brief.format,
            "Draft created",
        );
        self.publish(event_types::DRAFT_CREATED, actor.user_id, draft.id, serde_json::json!({
            "platform": brief.platform.label(),
            "format": brief.format.label(),
        }));

        let payload = generation_payload(actor, &brief, draft.created_at, Some(draft.id));
        let outcome = match self.race(payload).await {
            Race::TimedOut(handle) => {
                tracing::warn!(
                    draft_id = %draft.id,
                    timeout_secs = self.timeout.as_secs(),
                    "Generation webhook timed out; waiting for a late response in the background",
                );
                self.publish(
                    event_types::DRAFT_GENERATION_TIMED_OUT,
                    actor.user_id,
                    draft.id,
                    serde_json::Value::Null,
                );
                self.spawn_late_write(handle, actor.user_id, draft.id, &brief);
                SubmissionOutcome::TimedOut {
                    draft_id: Some(draft.id),
                }
            }
            Race::Settled(Err(reason)) => self.webhook_failed(actor.user_id, draft.id, reason),
            Race::Settled(Ok(body)) => match self.parse(&body, brief.format) {
                Err(reason) => self.webhook_failed(actor.user_id, draft.id, reason),
                Ok(content) if content.is_empty() => {
                    tracing::warn!(draft_id = %draft.id, "Generation webhook returned no content");
                    self.publish(
                        event_types::DRAFT_NO_CONTENT,
                        actor.user_id,
                        draft.id,
                        serde_json::Value::Null,
                    );
                    SubmissionOutcome::NoContent {
                        draft_id: Some(draft.id),
                    }
                }
                Ok(content) => {
                    let record = record_for(&content, brief.is_user_upload());
                    let updated = match self.drafts.record_generated(draft.id, &record).await {
                        Ok(Some(row)) => row,
                        Ok(None) => {
                            let err = CoreError::NotFound {
                                entity: "content_draft",
                                id: draft.id,
                            };
                            return Err(guard.fail(err.into()));
                        }
                        Err(e) => {
                            tracing::error!(draft_id = %draft.id, error = %e, "Failed to record generated content");
                            return Err(guard.fail(e.into()));
                        }
                    };
                    tracing::info!(draft_id = %draft.id, "Generated content recorded");
                    self.publish(
                        event_types::DRAFT_CONTENT_GENERATED,
                        actor.user_id,
                        draft.id,
                        serde_json::to_value(&content).unwrap_or_default(),
                    );
                    SubmissionOutcome::Generated {
                        draft_id: Some(draft.id),
                        media: MediaView::from_outputs(&updated.outputs()),
                        content,
                    }
                }
            },
        };

        let view = guard.settle(outcome.attempt_result());
        Ok(SubmissionReport { outcome, view })
    }

    /// Fire the webhook with `draft_id = null` and parse its answer without
    /// persisting anything. Shares the in-flight guard with [`submit`](Self::submit).
    pub async fn test_invocation(
        &self,
        actor: &Actor,
        brief: &ContentBrief,
    ) -> Result<SubmissionReport, PipelineError> {
        let brief = brief.validate()?;
        let guard = self.begin(actor.user_id)?;
        tracing::info!(user_id = %actor.user_id, "Test invocation of the generation webhook");

        let payload = generation_payload(actor, &brief, chrono::Utc::now(), None);
        let outcome = match self.race(payload).await {
            Race::TimedOut(handle) => {
                tracing::warn!(user_id = %actor.user_id, "Test invocation timed out");
                self.background.spawn("late_test_response", async move {
                    let mut handle = AbortOnDrop(handle);
                    let result = joined((&mut handle.0).await);
                    tracing::info!(ok = result.is_ok(), "Late test invocation response discarded");
                });
                SubmissionOutcome::TimedOut { draft_id: None }
            }
            Race::Settled(Err(reason)) => {
                tracing::warn!(%reason, "Test invocation webhook failed");
                SubmissionOutcome::WebhookFailed {
                    draft_id: None,
                    reason,
                }
            }
            Race::Settled(Ok(body)) => match self.parse(&body, brief.format) {
                Err(reason) => SubmissionOutcome::WebhookFailed {
                    draft_id: None,
                    reason,
                },
                Ok(content) if content.is_empty() => SubmissionOutcome::NoContent { draft_id: None },
                Ok(content) => {
                    let mut outputs = DraftOutputs {
                        generated_text: content.text.clone(),
                        generated_image_url: content.image_url.clone(),
                        generated_video_url: content.video_url.clone(),
                        ..Default::default()
                    };
                    if let Some((kind, url)) = brief.uploaded_media() {
                        match kind {
                            MediaKind::Image => outputs.uploaded_image_url = Some(url.to_string()),
                            MediaKind::Video => outputs.uploaded_video_url = Some(url.to_string()),
                        }
                    }
                    SubmissionOutcome::Generated {
                        draft_id: None,
                        media: MediaView::from_outputs(&outputs),
                        content,
                    }
                }
            },
        };

        let view = guard.settle(outcome.attempt_result());
        Ok(SubmissionReport { outcome, view })
    }

    /// The user's current result panel.
    pub fn panel(&self, user_id: UserId) -> PanelView {
        self.sessions.with(user_id, |s| PanelView::of(s))
    }

    /// Explicit re-check: re-fetch the latest draft and re-render.
    pub async fn refresh(&self, user_id: UserId) -> Result<PanelView, PipelineError> {
        let latest = self.drafts.find_latest(user_id).await?;
        let outputs = latest.as_ref().map(|d| (d.id, d.outputs()));
        Ok(self.sessions.with(user_id, |s| {
            s.refresh(outputs.as_ref().map(|(id, o)| (*id, o)));
            PanelView::of(s)
        }))
    }

    // ---- private helpers ----

    fn begin(&self, user_id: UserId) -> Result<AttemptGuard, PipelineError> {
        let attempt = self.sessions.with(user_id, |s| s.begin())?;
        Ok(AttemptGuard {
            registry: self.sessions.clone(),
            user_id,
            attempt,
            settled: false,
        })
    }

    async fn race(&self, payload: GenerationPayload) -> Race {
        let hook = self.hook.clone();
        let mut handle = tokio::spawn(async move { hook.generate(&payload).await });
        match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(result) => Race::Settled(joined(result)),
            Err(_) => Race::TimedOut(handle),
        }
    }

    fn parse(&self, body: &str, format: PostFormat) -> Result<ExtractedContent, String> {
        extract_content(body, &self.contract)
            .map(|c| c.for_format(format))
            .map_err(|e| e.to_string())
    }

    fn webhook_failed(&self, user_id: UserId, draft_id: DbId, reason: String) -> SubmissionOutcome {
        tracing::warn!(%draft_id, %reason, "Generation webhook failed");
        self.publish(
            event_types::DRAFT_WEBHOOK_FAILED,
            user_id,
            draft_id,
            serde_json::json!({ "reason": reason }),
        );
        SubmissionOutcome::WebhookFailed {
            draft_id: Some(draft_id),
            reason,
        }
    }

    fn spawn_late_write(
        &self,
        handle: JoinHandle<Result<String, WebhookError>>,
        user_id: UserId,
        draft_id: DbId,
        brief: &ValidatedBrief,
    ) {
        let drafts = self.drafts.clone();
        let bus = self.bus.clone();
        let contract = self.contract.clone();
        let format = brief.format;
        let user_upload = brief.is_user_upload();

        self.background.spawn("late_generation_write", async move {
            let mut handle = AbortOnDrop(handle);
            let body = match joined((&mut handle.0).await) {
                Ok(body) => body,
                Err(reason) => {
                    tracing::warn!(%draft_id, %reason, "Late generation webhook failed");
                    return;
                }
            };
            let content = match extract_content(&body, &contract) {
                Ok(content) => content.for_format(format),
                Err(e) => {
                    tracing::warn!(%draft_id, error = %e, "Late generation response unparseable");
                    return;
                }
            };
            if content.is_empty() {
                tracing::info!(%draft_id, "Late generation response carried no content");
                return;
            }
            match drafts
                .record_generated(draft_id, &record_for(&content, user_upload))
                .await
            {
                Ok(Some(_)) => {
                    tracing::info!(%draft_id, "Late generated content recorded");
                    bus.publish(
                        PlatformEvent::new(event_types::DRAFT_LATE_CONTENT)
                            .with_source("content_draft", draft_id)
                            .with_actor(user_id)
                            .with_payload(serde_json::to_value(&content).unwrap_or_default()),
                    );
                }
                Ok(None) => tracing::warn!(%draft_id, "Draft vanished before the late write"),
                Err(e) => tracing::error!(%draft_id, error = %e, "Late write failed"),
            }
        });
    }

    fn publish(&self, event_type: &str, user_id: UserId, draft_id: DbId, payload: serde_json::Value) {
        let mut event = PlatformEvent::new(event_type)
            .with_source("content_draft", draft_id)
            .with_actor(user_id);
        if !payload.is_null() {
            event = event.with_payload(payload);
        }
        self.bus.publish(event);
    }
}

fn new_draft(user_id: UserId, brief: &ValidatedBrief) -> CreateContentDraft {
    let uploaded = brief.uploaded_media();
    let uploaded_url = |want: MediaKind| {
        uploaded
            .filter(|(kind, _)| *kind == want)
            .map(|(_, url)| url.to_string())
    };
    CreateContentDraft {
        user_id,
        idea: brief.idea.clone(),
        platform: brief.platform.label().to_string(),
        format: brief.format.label().to_string(),
        asset_source: brief.asset_source.map(|s| s.label().to_string()),
        knowledge_base_file_name: brief.knowledge_base_file_name.clone(),
        asset_file_name: brief.asset_file.as_ref().map(|f| f.name.clone()),
        uploaded_image_url: uploaded_url(MediaKind::Image),
        uploaded_video_url: uploaded_url(MediaKind::Video),
    }
}

fn generation_payload(
    actor: &Actor,
    brief: &ValidatedBrief,
    created_at: Timestamp,
    draft_id: Option<DbId>,
) -> GenerationPayload {
    GenerationPayload {
        user_id: actor.user_id,
        email: actor.email.clone(),
        created_at,
        idea: brief.idea.clone(),
        platform: brief.platform.label().to_string(),
        format: brief.format.label().to_string(),
        asset_source: brief.asset_source.map(|s| s.label().to_string()),
        knowledge_base_file_name: brief.knowledge_base_file_name.clone(),
        asset_file_name: brief.asset_file.as_ref().map(|f| f.name.clone()),
        draft_id,
    }
}

fn record_for(content: &ExtractedContent, user_upload: bool) -> RecordGeneratedContent {
    RecordGeneratedContent {
        generated_text: content.text.clone(),
        generated_image_url: content.image_url.clone(),
        generated_video_url: content.video_url.clone(),
        mark_media_ready: user_upload,
    }
}
