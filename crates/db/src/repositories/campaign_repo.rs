//! Repository for the `campaigns` and `campaign_content` tables.

use std::collections::HashMap;

use postforge_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::campaign::{
    Campaign, CampaignContent, CampaignWithContent, CreateCampaign, CreateCampaignContent,
};

/// Column list for campaigns queries.
const CAMPAIGN_COLUMNS: &str =
    "id, user_id, campaign_name, content_idea, knowledge_base_file, status, created_at, updated_at";

/// Column list for campaign_content queries.
const CONTENT_COLUMNS: &str =
    "id, campaign_id, platform, text_content, image_link, video_link, created_at";

/// Status a new campaign starts in.
const INITIAL_STATUS: &str = "draft";

/// Escape LIKE wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Provides CRUD operations for campaigns and their content rows.
pub struct CampaignRepo;

impl CampaignRepo {
    /// All of a user's campaigns with content, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<CampaignWithContent>, sqlx::Error> {
        let query = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns
             WHERE user_id = $1
             ORDER BY created_at DESC"
        );
        let campaigns = sqlx::query_as::<_, Campaign>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Self::attach_content(pool, campaigns).await
    }

    /// Campaigns whose name contains `term`, case-insensitively.
    pub async fn search_by_name(
        pool: &PgPool,
        user_id: UserId,
        term: &str,
    ) -> Result<Vec<CampaignWithContent>, sqlx::Error> {
        let query = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns
             WHERE user_id = $1 AND campaign_name ILIKE $2
             ORDER BY created_at DESC"
        );
        let pattern = format!("%{}%", escape_like(term.trim()));
        let campaigns = sqlx::query_as::<_, Campaign>(&query)
            .bind(user_id)
            .bind(pattern)
            .fetch_all(pool)
            .await?;
        Self::attach_content(pool, campaigns).await
    }

    /// Find one campaign with its content, scoped to its owner.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: UserId,
        id: DbId,
    ) -> Result<Option<CampaignWithContent>, sqlx::Error> {
        let query = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1 AND user_id = $2");
        let campaign = sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        match campaign {
            Some(c) => Ok(Self::attach_content(pool, vec![c]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Insert a campaign with status `draft`.
    pub async fn create(
        pool: &PgPool,
        user_id: UserId,
        input: &CreateCampaign,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (user_id, campaign_name, content_idea, knowledge_base_file, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(user_id)
            .bind(&input.campaign_name)
            .bind(&input.content_idea)
            .bind(&input.knowledge_base_file)
            .bind(INITIAL_STATUS)
            .fetch_one(pool)
            .await
    }

    /// Add a per-platform content row to a campaign.
    pub async fn add_content(
        pool: &PgPool,
        campaign_id: DbId,
        input: &CreateCampaignContent,
    ) -> Result<CampaignContent, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaign_content (campaign_id, platform, text_content, image_link, video_link)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CONTENT_COLUMNS}"
        );
        sqlx::query_as::<_, CampaignContent>(&query)
            .bind(campaign_id)
            .bind(&input.platform)
            .bind(&input.text_content)
            .bind(&input.image_link)
            .bind(&input.video_link)
            .fetch_one(pool)
            .await
    }

    /// Set a campaign's status and bump `updated_at`.
    pub async fn update_status(
        pool: &PgPool,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET status = $3, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(user_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    async fn attach_content(
        pool: &PgPool,
        campaigns: Vec<Campaign>,
    ) -> Result<Vec<CampaignWithContent>, sqlx::Error> {
        if campaigns.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = campaigns.iter().map(|c| c.id).collect();
        let query = format!(
            "SELECT {CONTENT_COLUMNS} FROM campaign_content
             WHERE campaign_id = ANY($1)
             ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, CampaignContent>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut by_campaign: HashMap<DbId, Vec<CampaignContent>> = HashMap::new();
        for row in rows {
            by_campaign.entry(row.campaign_id).or_default().push(row);
        }
        Ok(campaigns
            .into_iter()
            .map(|campaign| CampaignWithContent {
                campaign_content: by_campaign.remove(&campaign.id).unwrap_or_default(),
                campaign,
            })
            .collect())
    }
}
