//! Row storage seams and their Postgres implementation.
//!
//! Every trait method that reads or writes user data takes the owner's id;
//! the one exception is [`DraftStore::record_generated`], which is keyed by
//! the draft id the pipeline itself just created.

use async_trait::async_trait;
use postforge_core::content::MediaKind;
use postforge_core::paid::GeneratedAdContent;
use postforge_core::paid::PaidContentForm;
use postforge_core::types::{DbId, UserId};
use postforge_db::models::campaign::{
    Campaign, CampaignContent, CampaignWithContent, CreateCampaign, CreateCampaignContent,
};
use postforge_db::models::content_draft::{
    ContentDraft, CreateContentDraft, RecordGeneratedContent,
};
use postforge_db::models::paid_content::PaidContent;
use postforge_db::repositories::{CampaignRepo, ContentDraftRepo, PaidContentRepo};
use sqlx::PgPool;

use crate::error::StoreError;

#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn create(&self, input: &CreateContentDraft) -> Result<ContentDraft, StoreError>;

    async fn find_latest(&self, user_id: UserId) -> Result<Option<ContentDraft>, StoreError>;

    async fn record_generated(
        &self,
        id: DbId,
        input: &RecordGeneratedContent,
    ) -> Result<Option<ContentDraft>, StoreError>;

    async fn set_status(&self, user_id: UserId, id: DbId, status: &str)
        -> Result<bool, StoreError>;

    async fn attach_uploaded_media(
        &self,
        user_id: UserId,
        id: DbId,
        kind: MediaKind,
        url: &str,
    ) -> Result<Option<ContentDraft>, StoreError>;
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CampaignWithContent>, StoreError>;

    async fn search_by_name(
        &self,
        user_id: UserId,
        term: &str,
    ) -> Result<Vec<CampaignWithContent>, StoreError>;

    async fn find_for_user(
        &self,
        user_id: UserId,
        id: DbId,
    ) -> Result<Option<CampaignWithContent>, StoreError>;

    async fn create(&self, user_id: UserId, input: &CreateCampaign) -> Result<Campaign, StoreError>;

    async fn add_content(
        &self,
        campaign_id: DbId,
        input: &CreateCampaignContent,
    ) -> Result<CampaignContent, StoreError>;

    async fn update_status(
        &self,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<Option<Campaign>, StoreError>;
}

#[async_trait]
pub trait PaidContentStore: Send + Sync {
    async fn create(&self, user_id: UserId, form: &PaidContentForm)
        -> Result<PaidContent, StoreError>;

    async fn record_generated(
        &self,
        user_id: UserId,
        id: DbId,
        content: &GeneratedAdContent,
        status: &str,
    ) -> Result<Option<PaidContent>, StoreError>;

    async fn set_status(
        &self,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<Option<PaidContent>, StoreError>;

    async fn find_for_user(&self, user_id: UserId, id: DbId)
        -> Result<Option<PaidContent>, StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// All three stores over one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DraftStore for PgStore {
    async fn create(&self, input: &CreateContentDraft) -> Result<ContentDraft, StoreError> {
        Ok(ContentDraftRepo::create(&self.pool, input).await?)
    }

    async fn find_latest(&self, user_id: UserId) -> Result<Option<ContentDraft>, StoreError> {
        Ok(ContentDraftRepo::find_latest_for_user(&self.pool, user_id).await?)
    }

    async fn record_generated(
        &self,
        id: DbId,
        input: &RecordGeneratedContent,
    ) -> Result<Option<ContentDraft>, StoreError> {
        Ok(ContentDraftRepo::record_generated(&self.pool, id, input).await?)
    }

    async fn set_status(
        &self,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<bool, StoreError> {
        Ok(ContentDraftRepo::set_status(&self.pool, user_id, id, status).await?)
    }

    async fn attach_uploaded_media(
        &self,
        user_id: UserId,
        id: DbId,
        kind: MediaKind,
        url: &str,
    ) -> Result<Option<ContentDraft>, StoreError> {
        Ok(ContentDraftRepo::attach_uploaded_media(&self.pool, user_id, id, kind, url).await?)
    }
}

#[async_trait]
impl CampaignStore for PgStore {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CampaignWithContent>, StoreError> {
        Ok(CampaignRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn search_by_name(
        &self,
        user_id: UserId,
        term: &str,
    ) -> Result<Vec<CampaignWithContent>, StoreError> {
        Ok(CampaignRepo::search_by_name(&self.pool, user_id, term).await?)
    }

    async fn find_for_user(
        &self,
        user_id: UserId,
        id: DbId,
    ) -> Result<Option<CampaignWithContent>, StoreError> {
        Ok(CampaignRepo::find_for_user(&self.pool, user_id, id).await?)
    }

    async fn create(&self, user_id: UserId, input: &CreateCampaign) -> Result<Campaign, StoreError> {
        Ok(CampaignRepo::create(&self.pool, user_id, input).await?)
    }

    async fn add_content(
        &self,
        campaign_id: DbId,
        input: &CreateCampaignContent,
    ) -> Result<CampaignContent, StoreError> {
        Ok(CampaignRepo::add_content(&self.pool, campaign_id, input).await?)
    }

    async fn update_status(
        &self,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<Option<Campaign>, StoreError> {
        Ok(CampaignRepo::update_status(&self.pool, user_id, id, status).await?)
    }
}

#[async_trait]
impl PaidContentStore for PgStore {
    async fn create(
        &self,
        user_id: UserId,
        form: &PaidContentForm,
    ) -> Result<PaidContent, StoreError> {
        Ok(PaidContentRepo::create(&self.pool, user_id, form).await?)
    }

    async fn record_generated(
        &self,
        user_id: UserId,
        id: DbId,
        content: &GeneratedAdContent,
        status: &str,
    ) -> Result<Option<PaidContent>, StoreError> {
        Ok(PaidContentRepo::record_generated(&self.pool, user_id, id, content, status).await?)
    }

    async fn set_status(
        &self,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<Option<PaidContent>, StoreError> {
        Ok(PaidContentRepo::set_status(&self.pool, user_id, id, status).await?)
    }

    async fn find_for_user(
        &self,
        user_id: UserId,
        id: DbId,
    ) -> Result<Option<PaidContent>, StoreError> {
        Ok(PaidContentRepo::find_for_user(&self.pool, user_id, id).await?)
    }
}
