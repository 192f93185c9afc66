//! Result panel state for the generation workflow.
//!
//! A [`GenerationSession`] is the per-user view of draft generation. It
//! renders exactly one [`ResultPanel`] at a time and doubles as the submit
//! guard: a new attempt cannot begin while one is in flight. Resolutions
//! are keyed by [`AttemptId`] and are dropped once the attempt has been
//! settled, so a webhook that answers after the timeout cannot flip a
//! `TimedOut` panel. Only an explicit [`GenerationSession::refresh`] does.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Where the timed-out panel sends the user to re-check.
pub const RECHECK_PATH: &str = "/content-review";

// ---------------------------------------------------------------------------
// Media precedence
// ---------------------------------------------------------------------------

/// Output columns of a draft row, as read back from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOutputs {
    pub generated_text: Option<String>,
    pub generated_image_url: Option<String>,
    pub generated_video_url: Option<String>,
    pub uploaded_image_url: Option<String>,
    pub uploaded_video_url: Option<String>,
    pub media_ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaOrigin {
    Uploaded,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSlot {
    pub url: String,
    pub origin: MediaOrigin,
}

/// What the success panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaView {
    pub text: Option<String>,
    pub image: Option<MediaSlot>,
    pub video: Option<MediaSlot>,
    pub media_ready: bool,
}

impl MediaView {
    /// Build the view from a draft row. A user-uploaded asset always wins
    /// over a generated one in the same slot.
    pub fn from_outputs(outputs: &DraftOutputs) -> Self {
        Self {
            text: non_blank(outputs.generated_text.as_deref()),
            image: pick_slot(
                outputs.uploaded_image_url.as_deref(),
                outputs.generated_image_url.as_deref(),
            ),
            video: pick_slot(
                outputs.uploaded_video_url.as_deref(),
                outputs.generated_video_url.as_deref(),
            ),
            media_ready: outputs.media_ready,
        }
    }

    pub fn has_content(&self) -> bool {
        self.text.is_some() || self.image.is_some() || self.video.is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn pick_slot(uploaded: Option<&str>, generated: Option<&str>) -> Option<MediaSlot> {
    if let Some(url) = non_blank(uploaded) {
        return Some(MediaSlot {
            url,
            origin: MediaOrigin::Uploaded,
        });
    }
    non_blank(generated).map(|url| MediaSlot {
        url,
        origin: MediaOrigin::Generated,
    })
}

// ---------------------------------------------------------------------------
// Panel + notices
// ---------------------------------------------------------------------------

/// The four mutually exclusive result states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResultPanel {
    AwaitingSubmission,
    InProgress,
    Success {
        /// `None` for a test invocation, which persists nothing.
        draft_id: Option<DbId>,
        media: MediaView,
    },
    TimedOut {
        /// `None` for a test invocation.
        draft_id: Option<DbId>,
        recheck_path: String,
    },
}

/// Soft message shown next to the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Generated,
    NoContentYet,
    TimedOut,
    WebhookFailed { reason: String },
    Error { message: String },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Generated => "Your post has been generated.".to_string(),
            Notice::NoContentYet => {
                "The draft was saved but no content came back yet. Check back shortly.".to_string()
            }
            Notice::TimedOut => {
                "Generation is taking longer than expected and may still be processing. Check back later."
                    .to_string()
            }
            Notice::WebhookFailed { .. } => {
                "The content generator could not be reached. Your draft was saved; try again later."
                    .to_string()
            }
            Notice::Error { message } => message.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub u64);

/// How an attempt settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Generated { draft_id: Option<DbId>, media: MediaView },
    NoContent,
    TimedOut { draft_id: Option<DbId> },
    WebhookFailed { reason: String },
    Failed { message: String },
}

/// Panel, notice, and in-flight guard for one user.
#[derive(Debug, Clone)]
pub struct GenerationSession {
    panel: ResultPanel,
    notice: Option<Notice>,
    current: u64,
    in_flight: bool,
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self {
            panel: ResultPanel::AwaitingSubmission,
            notice: None,
            current: 0,
            in_flight: false,
        }
    }
}

impl GenerationSession {
    pub fn panel(&self) -> &ResultPanel {
        &self.panel
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start an attempt. Fails while another one is in flight.
    pub fn begin(&mut self) -> Result<AttemptId, CoreError> {
        if self.in_flight {
            return Err(CoreError::Conflict(
                "A content generation request is already in progress".to_string(),
            ));
        }
        self.current += 1;
        self.in_flight = true;
        self.panel = ResultPanel::InProgress;
        self.notice = None;
        Ok(AttemptId(self.current))
    }

    /// Settle an attempt. Returns `false` (and changes nothing) when the
    /// attempt is stale or already settled.
    pub fn finish(&mut self, attempt: AttemptId, result: AttemptResult) -> bool {
        if !self.in_flight || attempt.0 != self.current {
            return false;
        }
        self.in_flight = false;
        let (panel, notice) = match result {
            AttemptResult::Generated { draft_id, media } => (
                ResultPanel::Success { draft_id, media },
                Notice::Generated,
            ),
            AttemptResult::NoContent => (ResultPanel::AwaitingSubmission, Notice::NoContentYet),
            AttemptResult::TimedOut { draft_id } => (
                ResultPanel::TimedOut {
                    draft_id,
                    recheck_path: RECHECK_PATH.to_string(),
                },
                Notice::TimedOut,
            ),
            AttemptResult::WebhookFailed { reason } => (
                ResultPanel::AwaitingSubmission,
                Notice::WebhookFailed { reason },
            ),
            AttemptResult::Failed { message } => {
                (ResultPanel::AwaitingSubmission, Notice::Error { message })
            }
        };
        self.panel = panel;
        self.notice = Some(notice);
        true
    }

    /// Explicit re-check against freshly fetched storage state.
    ///
    /// Shows the latest draft when it has content. A timed-out panel stays
    /// timed out while its draft is still empty. Ignored while an attempt is
    /// in flight.
    pub fn refresh(&mut self, latest: Option<(DbId, &DraftOutputs)>) {
        if self.in_flight {
            return;
        }
        self.notice = None;
        match latest {
            Some((draft_id, outputs)) => {
                let media = MediaView::from_outputs(outputs);
                if media.has_content() {
                    self.panel = ResultPanel::Success {
                        draft_id: Some(draft_id),
                        media,
                    };
                } else if !matches!(self.panel, ResultPanel::TimedOut { draft_id: Some(d), .. } if d == draft_id)
                {
                    self.notice = Some(Notice::NoContentYet);
                    self.panel = ResultPanel::AwaitingSubmission;
                }
            }
            None => self.panel = ResultPanel::AwaitingSubmission,
        }
    }
}
