//! In-memory fakes for the store, hook and object-store seams.
//!
//! Compiled for this crate's tests and, behind the `testing` feature, for
//! the API crate's router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use postforge_cloud::{CloudError, ObjectStore};
use postforge_core::content::{MediaKind, STATUS_DRAFT_CREATED};
use postforge_core::paid::{GeneratedAdContent, PaidContentForm, PAID_STATUS_DRAFT};
use postforge_core::types::{DbId, UserId};
use postforge_db::models::campaign::{
    Campaign, CampaignContent, CampaignWithContent, CreateCampaign, CreateCampaignContent,
};
use postforge_db::models::content_draft::{
    ContentDraft, CreateContentDraft, RecordGeneratedContent,
};
use postforge_db::models::paid_content::PaidContent;
use postforge_events::{ApprovalPayload, GenerationPayload, WebhookError};
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::StoreError;
use crate::hooks::{ApprovalHook, GenerationHook};
use crate::store::{CampaignStore, DraftStore, PaidContentStore};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unavailable() -> StoreError {
    StoreError::Backend("storage unavailable".to_string())
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

/// Draft rows in insertion order.
#[derive(Default)]
pub struct MemoryDraftStore {
    rows: Mutex<Vec<ContentDraft>>,
    fail_writes: AtomicBool,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<ContentDraft> {
        lock(&self.rows).clone()
    }

    pub fn get(&self, id: DbId) -> Option<ContentDraft> {
        lock(&self.rows).iter().find(|r| r.id == id).cloned()
    }

    /// Seed a row directly, bypassing the workflow.
    pub fn insert(&self, row: ContentDraft) {
        lock(&self.rows).push(row);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn create(&self, input: &CreateContentDraft) -> Result<ContentDraft, StoreError> {
        self.check_writable()?;
        let row = ContentDraft {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            created_at: Utc::now(),
            idea: input.idea.clone(),
            platform: input.platform.clone(),
            format: input.format.clone(),
            asset_source: input.asset_source.clone(),
            knowledge_base_file_name: input.knowledge_base_file_name.clone(),
            asset_file_name: input.asset_file_name.clone(),
            status: STATUS_DRAFT_CREATED.to_string(),
            generated_text: None,
            generated_image_url: None,
            generated_video_url: None,
            uploaded_image_url: input.uploaded_image_url.clone(),
            uploaded_video_url: input.uploaded_video_url.clone(),
            media_ready: false,
            generated_at: None,
        };
        lock(&self.rows).push(row.clone());
        Ok(row)
    }

    async fn find_latest(&self, user_id: UserId) -> Result<Option<ContentDraft>, StoreError> {
        Ok(lock(&self.rows)
            .iter()
            .rev()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn record_generated(
        &self,
        id: DbId,
        input: &RecordGeneratedContent,
    ) -> Result<Option<ContentDraft>, StoreError> {
        self.check_writable()?;
        let mut rows = lock(&self.rows);
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if input.generated_text.is_some() {
            row.generated_text = input.generated_text.clone();
        }
        if input.generated_image_url.is_some() {
            row.generated_image_url = input.generated_image_url.clone();
        }
        if input.generated_video_url.is_some() {
            row.generated_video_url = input.generated_video_url.clone();
        }
        row.media_ready |= input.mark_media_ready;
        row.status = postforge_core::content::STATUS_CONTENT_GENERATED.to_string();
        row.generated_at = Some(Utc::now());
        Ok(Some(row.clone()))
    }

    async fn set_status(
        &self,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<bool, StoreError> {
        self.check_writable()?;
        let mut rows = lock(&self.rows);
        match rows.iter_mut().find(|r| r.id == id && r.user_id == user_id) {
            Some(row) => {
                row.status = status.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn attach_uploaded_media(
        &self,
        user_id: UserId,
        id: DbId,
        kind: MediaKind,
        url: &str,
    ) -> Result<Option<ContentDraft>, StoreError> {
        self.check_writable()?;
        let mut rows = lock(&self.rows);
        let Some(row) = rows.iter_mut().find(|r| r.id == id && r.user_id == user_id) else {
            return Ok(None);
        };
        match kind {
            MediaKind::Image => row.uploaded_image_url = Some(url.to_string()),
            MediaKind::Video => row.uploaded_video_url = Some(url.to_string()),
        }
        Ok(Some(row.clone()))
    }
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Status(u16),
}

/// Generation hook answering every call the same way after a delay.
pub struct ScriptedHook {
    reply: Reply,
    delay: Duration,
    calls: Mutex<Vec<GenerationPayload>>,
}

impl ScriptedHook {
    pub fn responding(body: &str) -> Self {
        Self::delayed(body, Duration::ZERO)
    }

    pub fn delayed(body: &str, delay: Duration) -> Self {
        Self {
            reply: Reply::Body(body.to_string()),
            delay,
            calls: Mutex::default(),
        }
    }

    /// Answer with a non-success HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Reply::Status(status),
            delay: Duration::ZERO,
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<GenerationPayload> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl GenerationHook for ScriptedHook {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, WebhookError> {
        lock(&self.calls).push(payload.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Reply::Body(body) => Ok(body.clone()),
            Reply::Status(status) => Err(WebhookError::HttpStatus(*status)),
        }
    }
}

/// Approval hook recording every notification.
#[derive(Default)]
pub struct RecordingApprovalHook {
    calls: Mutex<Vec<ApprovalPayload>>,
    fail: AtomicBool,
}

impl RecordingApprovalHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let hook = Self::default();
        hook.fail.store(true, Ordering::SeqCst);
        hook
    }

    pub fn calls(&self) -> Vec<ApprovalPayload> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ApprovalHook for RecordingApprovalHook {
    async fn notify_approved(&self, payload: &ApprovalPayload) -> Result<(), WebhookError> {
        lock(&self.calls).push(payload.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(WebhookError::HttpStatus(500));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub size: usize,
    pub access_token: String,
}

/// Object store keyed by path. Refuses to overwrite, like the backend with
/// `x-upsert: false`.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
}

pub const MEMORY_PUBLIC_BASE: &str = "https://storage.test/public";

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, path: &str) -> Option<StoredObject> {
        lock(&self.objects).get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        lock(&self.objects).keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        access_token: &str,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), CloudError> {
        let mut objects = lock(&self.objects);
        if objects.contains_key(path) {
            return Err(CloudError::Api {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                size: body.len(),
                access_token: access_token.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> Result<String, CloudError> {
        Ok(format!("{MEMORY_PUBLIC_BASE}/{path}"))
    }
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

/// Campaigns with their content, newest first on listing.
#[derive(Default)]
pub struct MemoryCampaignStore {
    campaigns: Mutex<Vec<CampaignWithContent>>,
}

impl MemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a campaign directly.
    pub fn insert(&self, campaign: CampaignWithContent) {
        lock(&self.campaigns).push(campaign);
    }

    fn owned_by(&self, user_id: UserId) -> Vec<CampaignWithContent> {
        let mut rows: Vec<_> = lock(&self.campaigns)
            .iter()
            .filter(|c| c.campaign.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.campaign.created_at.cmp(&a.campaign.created_at));
        rows
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CampaignWithContent>, StoreError> {
        Ok(self.owned_by(user_id))
    }

    async fn search_by_name(
        &self,
        user_id: UserId,
        term: &str,
    ) -> Result<Vec<CampaignWithContent>, StoreError> {
        let needle = term.to_lowercase();
        Ok(self
            .owned_by(user_id)
            .into_iter()
            .filter(|c| c.campaign.campaign_name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn find_for_user(
        &self,
        user_id: UserId,
        id: DbId,
    ) -> Result<Option<CampaignWithContent>, StoreError> {
        Ok(self.owned_by(user_id).into_iter().find(|c| c.campaign.id == id))
    }

    async fn create(&self, user_id: UserId, input: &CreateCampaign) -> Result<Campaign, StoreError> {
        let now = Utc::now();
        let campaign = Campaign {
            id: Uuid::new_v4(),
            user_id,
            campaign_name: input.campaign_name.clone(),
            content_idea: input.content_idea.clone(),
            knowledge_base_file: input.knowledge_base_file.clone(),
            status: "draft".to_string(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.campaigns).push(CampaignWithContent {
            campaign: campaign.clone(),
            campaign_content: Vec::new(),
        });
        Ok(campaign)
    }

    async fn add_content(
        &self,
        campaign_id: DbId,
        input: &CreateCampaignContent,
    ) -> Result<CampaignContent, StoreError> {
        let mut campaigns = lock(&self.campaigns);
        let Some(parent) = campaigns.iter_mut().find(|c| c.campaign.id == campaign_id) else {
            return Err(StoreError::Backend(format!(
                "campaign {campaign_id} does not exist"
            )));
        };
        let content = CampaignContent {
            id: Uuid::new_v4(),
            campaign_id,
            platform: input.platform.clone(),
            text_content: input.text_content.clone(),
            image_link: input.image_link.clone(),
            video_link: input.video_link.clone(),
            created_at: Utc::now(),
        };
        parent.campaign_content.push(content.clone());
        Ok(content)
    }

    async fn update_status(
        &self,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<Option<Campaign>, StoreError> {
        let mut campaigns = lock(&self.campaigns);
        let Some(row) = campaigns
            .iter_mut()
            .find(|c| c.campaign.id == id && c.campaign.user_id == user_id)
        else {
            return Ok(None);
        };
        row.campaign.status = status.to_string();
        row.campaign.updated_at = Utc::now();
        Ok(Some(row.campaign.clone()))
    }
}

// ---------------------------------------------------------------------------
// Paid content
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryPaidContentStore {
    rows: Mutex<Vec<PaidContent>>,
}

impl MemoryPaidContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<PaidContent> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl PaidContentStore for MemoryPaidContentStore {
    async fn create(
        &self,
        user_id: UserId,
        form: &PaidContentForm,
    ) -> Result<PaidContent, StoreError> {
        let now = Utc::now();
        let row = PaidContent {
            id: Uuid::new_v4(),
            user_id,
            campaign_name: form.campaign_name.clone(),
            primary_goal: form.primary_goal.clone(),
            target_platform: form.target_platform.clone(),
            audience_type: form.audience_type.clone(),
            audience_characteristics: form.audience_characteristics.clone(),
            age_range: form.age_range.clone(),
            gender: form.gender.clone(),
            location: form.location.clone(),
            language: form.language.clone(),
            budget_type: form.budget_type.clone(),
            budget_amount: form.budget_amount.unwrap_or_default(),
            start_date: form.start_date,
            end_date: form.end_date,
            optimization_preference: form.optimization_preference.clone(),
            content_idea: form.content_idea.clone(),
            brand_tone: form.brand_tone.clone(),
            cta_objective: form.cta_objective.clone(),
            visual_style: form.visual_style.clone(),
            generate_ad_copy: form.generate_ad_copy,
            generate_headlines: form.generate_headlines,
            generate_cta_text: form.generate_cta_text,
            generate_image_prompt: form.generate_image_prompt,
            generate_video_hooks: form.generate_video_hooks,
            number_of_variations: form.number_of_variations,
            generated_ad_copy: None,
            generated_headlines: None,
            generated_cta_suggestions: None,
            generated_image_prompt: None,
            generated_video_hooks: None,
            status: PAID_STATUS_DRAFT.to_string(),
            created_at: now,
            updated_at: now,
        };
        lock(&self.rows).push(row.clone());
        Ok(row)
    }

    async fn record_generated(
        &self,
        user_id: UserId,
        id: DbId,
        content: &GeneratedAdContent,
        status: &str,
    ) -> Result<Option<PaidContent>, StoreError> {
        let mut rows = lock(&self.rows);
        let Some(row) = rows.iter_mut().find(|r| r.id == id && r.user_id == user_id) else {
            return Ok(None);
        };
        row.generated_ad_copy = Some(content.ad_copy.clone());
        row.generated_headlines = Some(Json(content.headlines.clone()));
        row.generated_cta_suggestions = Some(Json(content.cta_suggestions.clone()));
        row.generated_image_prompt = Some(content.image_prompt.clone());
        row.generated_video_hooks = Some(Json(content.video_hooks.clone()));
        row.status = status.to_string();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn set_status(
        &self,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<Option<PaidContent>, StoreError> {
        let mut rows = lock(&self.rows);
        let Some(row) = rows.iter_mut().find(|r| r.id == id && r.user_id == user_id) else {
            return Ok(None);
        };
        row.status = status.to_string();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn find_for_user(
        &self,
        user_id: UserId,
        id: DbId,
    ) -> Result<Option<PaidContent>, StoreError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }
}
