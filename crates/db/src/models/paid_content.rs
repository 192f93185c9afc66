//! Paid-content rows.

use chrono::NaiveDate;
use postforge_core::paid::{GeneratedAdContent, PaidContentForm};
use postforge_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `paid_content` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PaidContent {
    pub id: DbId,
    pub user_id: UserId,
    pub campaign_name: String,
    pub primary_goal: String,
    pub target_platform: String,
    pub audience_type: String,
    pub audience_characteristics: String,
    pub age_range: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub budget_type: String,
    pub budget_amount: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub optimization_preference: String,
    pub content_idea: String,
    pub brand_tone: String,
    pub cta_objective: String,
    pub visual_style: String,
    pub generate_ad_copy: bool,
    pub generate_headlines: bool,
    pub generate_cta_text: bool,
    pub generate_image_prompt: bool,
    pub generate_video_hooks: bool,
    pub number_of_variations: i32,
    pub generated_ad_copy: Option<String>,
    pub generated_headlines: Option<Json<Vec<String>>>,
    pub generated_cta_suggestions: Option<Json<Vec<String>>>,
    pub generated_image_prompt: Option<String>,
    pub generated_video_hooks: Option<Json<Vec<String>>>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaidContent {
    /// The brief this row was created from.
    pub fn form(&self) -> PaidContentForm {
        PaidContentForm {
            campaign_name: self.campaign_name.clone(),
            primary_goal: self.primary_goal.clone(),
            target_platform: self.target_platform.clone(),
            audience_type: self.audience_type.clone(),
            audience_characteristics: self.audience_characteristics.clone(),
            age_range: self.age_range.clone(),
            gender: self.gender.clone(),
            location: self.location.clone(),
            language: self.language.clone(),
            budget_type: self.budget_type.clone(),
            budget_amount: Some(self.budget_amount),
            start_date: self.start_date,
            end_date: self.end_date,
            optimization_preference: self.optimization_preference.clone(),
            content_idea: self.content_idea.clone(),
            brand_tone: self.brand_tone.clone(),
            cta_objective: self.cta_objective.clone(),
            visual_style: self.visual_style.clone(),
            generate_ad_copy: self.generate_ad_copy,
            generate_headlines: self.generate_headlines,
            generate_cta_text: self.generate_cta_text,
            generate_image_prompt: self.generate_image_prompt,
            generate_video_hooks: self.generate_video_hooks,
            number_of_variations: self.number_of_variations,
        }
    }

    /// Generated content, once every generated column is populated.
    pub fn generated(&self) -> Option<GeneratedAdContent> {
        Some(GeneratedAdContent {
            ad_copy: self.generated_ad_copy.clone()?,
            headlines: self.generated_headlines.as_ref()?.0.clone(),
            cta_suggestions: self.generated_cta_suggestions.as_ref()?.0.clone(),
            image_prompt: self.generated_image_prompt.clone()?,
            video_hooks: self.generated_video_hooks.as_ref()?.0.clone(),
        })
    }
}
