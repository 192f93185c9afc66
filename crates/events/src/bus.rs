//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use postforge_core::types::{DbId, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event names published by the workflows.
pub mod event_types {
    pub const DRAFT_CREATED: &str = "draft.created";
    pub const DRAFT_CONTENT_GENERATED: &str = "draft.content_generated";
    pub const DRAFT_NO_CONTENT: &str = "draft.no_content";
    pub const DRAFT_GENERATION_TIMED_OUT: &str = "draft.generation_timed_out";
    pub const DRAFT_WEBHOOK_FAILED: &str = "draft.webhook_failed";
    /// A webhook answered after its attempt had already timed out.
    pub const DRAFT_LATE_CONTENT: &str = "draft.late_content";
    pub const DRAFT_ASSET_UPLOADED: &str = "draft.asset_uploaded";
    pub const DRAFT_APPROVED: &str = "draft.approved";
    pub const DRAFT_REJECTED: &str = "draft.rejected";
    pub const AUTH_SIGNED_IN: &str = "auth.signed_in";
    pub const AUTH_SIGNED_OUT: &str = "auth.signed_out";
}

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event.
///
/// Constructed via [`PlatformEvent::new`] and enriched with
/// [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor), and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"draft.created"`.
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<UserId>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: UserId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity. Slow receivers see
    /// `RecvError::Lagged` once the buffer wraps.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. Dropped silently when
    /// nobody is listening.
    pub fn publish(&self, event: PlatformEvent) {
        tracing::debug!(event_type = %event.event_type, "Publishing event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
