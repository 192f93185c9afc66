//! Campaign history rows: a campaign plus its per-platform content.

use postforge_core::content::campaign_platform_label;
use postforge_core::history::HistoryRow;
use postforge_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `campaigns` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub user_id: UserId,
    pub campaign_name: String,
    pub content_idea: String,
    pub knowledge_base_file: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `campaign_content` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct CampaignContent {
    pub id: DbId,
    pub campaign_id: DbId,
    pub platform: String,
    pub text_content: Option<String>,
    pub image_link: Option<String>,
    pub video_link: Option<String>,
    pub created_at: Timestamp,
}

/// A campaign with its child content rows, as listed by the history page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignWithContent {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub campaign_content: Vec<CampaignContent>,
}

impl CampaignWithContent {
    /// Comma-separated platform labels of the child rows.
    pub fn platforms_list(&self) -> String {
        self.campaign_content
            .iter()
            .map(|c| campaign_platform_label(&c.platform))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl HistoryRow for CampaignWithContent {
    fn id(&self) -> DbId {
        self.campaign.id
    }

    fn created_at(&self) -> Timestamp {
        self.campaign.created_at
    }

    fn status(&self) -> &str {
        &self.campaign.status
    }
}

/// DTO for creating a campaign. Status starts at `draft`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaign {
    pub campaign_name: String,
    pub content_idea: String,
    pub knowledge_base_file: Option<String>,
}

/// DTO for adding per-platform content to a campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignContent {
    /// `facebook`, `x`, or `instagram`.
    pub platform: String,
    pub text_content: Option<String>,
    pub image_link: Option<String>,
    pub video_link: Option<String>,
}
