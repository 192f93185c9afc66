//! Postforge event bus and outbound webhook client.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Workflow milestones (draft created, content
//!   generated, late content after a timeout, approval decisions) are
//!   published here so tests and log sinks can observe them.
//! - [`delivery::webhook`]: HTTP client for the generation and approval
//!   automation webhooks.

pub mod bus;
pub mod delivery;

pub use bus::{event_types, EventBus, PlatformEvent};
pub use delivery::webhook::{ApprovalPayload, GenerationPayload, WebhookClient, WebhookError};
