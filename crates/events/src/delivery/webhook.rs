//! Client for the generation and approval automation webhooks.
//!
//! Both webhooks take a JSON POST. The generation webhook's response body
//! is returned verbatim for the response contract parser; the approval
//! webhook's response is ignored. Nothing is retried here: a retry is
//! always a manual action by the user.

use std::time::Duration;

use chrono::{DateTime, Utc};
use postforge_core::types::{DbId, UserId};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Network, DNS, TLS, or hard-timeout failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Request body of the generation webhook.
///
/// Optional fields serialize as `null` rather than being omitted; the
/// automation reads every key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationPayload {
    pub user_id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub idea: String,
    pub platform: String,
    pub format: String,
    pub asset_source: Option<String>,
    pub knowledge_base_file_name: Option<String>,
    pub asset_file_name: Option<String>,
    /// `None` for a test invocation, which creates no draft.
    pub draft_id: Option<DbId>,
}

/// Request body of the approval webhook. The automation keys on
/// `draft_id`; the rest lets it publish without reading the row back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalPayload {
    pub draft_id: DbId,
    pub user_id: UserId,
    pub email: String,
    pub status: String,
    pub platform: String,
    pub content_text: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub approved_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// WebhookClient
// ---------------------------------------------------------------------------

/// Sends workflow payloads to the automation webhooks.
#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    /// Build a client whose requests give up after `hard_timeout`.
    ///
    /// The hard timeout is not the generation race timeout: it only bounds
    /// how long a request that already lost the race may keep running.
    pub fn new(hard_timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(hard_timeout).build()?;
        Ok(Self { client })
    }

    /// POST the generation payload and return the raw response body.
    pub async fn post_generation(
        &self,
        url: &str,
        payload: &GenerationPayload,
    ) -> Result<String, WebhookError> {
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "Generation webhook returned an error status");
            return Err(WebhookError::HttpStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Notify the approval webhook that a draft was approved. The response
    /// body is ignored.
    pub async fn notify_approval(
        &self,
        url: &str,
        payload: &ApprovalPayload,
    ) -> Result<(), WebhookError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
