//! Automation webhook seams and their HTTP implementation.

use async_trait::async_trait;
use postforge_events::{ApprovalPayload, GenerationPayload, WebhookClient, WebhookError};

/// The content generation automation.
#[async_trait]
pub trait GenerationHook: Send + Sync {
    /// Send the payload and return the raw response body.
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, WebhookError>;
}

/// The post-approval automation. Best-effort.
#[async_trait]
pub trait ApprovalHook: Send + Sync {
    async fn notify_approved(&self, payload: &ApprovalPayload) -> Result<(), WebhookError>;
}

/// Both hooks over HTTP.
#[derive(Clone)]
pub struct HttpHooks {
    client: WebhookClient,
    generation_url: String,
    approval_url: String,
}

impl HttpHooks {
    pub fn new(client: WebhookClient, generation_url: String, approval_url: String) -> Self {
        Self {
            client,
            generation_url,
            approval_url,
        }
    }
}

#[async_trait]
impl GenerationHook for HttpHooks {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, WebhookError> {
        self.client.post_generation(&self.generation_url, payload).await
    }
}

#[async_trait]
impl ApprovalHook for HttpHooks {
    async fn notify_approved(&self, payload: &ApprovalPayload) -> Result<(), WebhookError> {
        self.client.notify_approval(&self.approval_url, payload).await
    }
}
