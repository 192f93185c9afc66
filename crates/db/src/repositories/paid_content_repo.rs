//! Repository for the `paid_content` table.

use postforge_core::paid::{GeneratedAdContent, PaidContentForm, PAID_STATUS_DRAFT};
use postforge_core::types::{DbId, UserId};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::paid_content::PaidContent;

const COLUMNS: &str = "id, user_id, campaign_name, primary_goal, target_platform, audience_type, \
    audience_characteristics, age_range, gender, location, language, budget_type, budget_amount, \
    start_date, end_date, optimization_preference, content_idea, brand_tone, cta_objective, \
    visual_style, generate_ad_copy, generate_headlines, generate_cta_text, generate_image_prompt, \
    generate_video_hooks, number_of_variations, generated_ad_copy, generated_headlines, \
    generated_cta_suggestions, generated_image_prompt, generated_video_hooks, status, \
    created_at, updated_at";

pub struct PaidContentRepo;

impl PaidContentRepo {
    /// Insert a validated brief with status `draft`.
    pub async fn create(
        pool: &PgPool,
        user_id: UserId,
        form: &PaidContentForm,
    ) -> Result<PaidContent, sqlx::Error> {
        let query = format!(
            "INSERT INTO paid_content
                (user_id, campaign_name, primary_goal, target_platform, audience_type,
                 audience_characteristics, age_range, gender, location, language, budget_type,
                 budget_amount, start_date, end_date, optimization_preference, content_idea,
                 brand_tone, cta_objective, visual_style, generate_ad_copy, generate_headlines,
                 generate_cta_text, generate_image_prompt, generate_video_hooks,
                 number_of_variations, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaidContent>(&query)
            .bind(user_id)
            .bind(&form.campaign_name)
            .bind(&form.primary_goal)
            .bind(&form.target_platform)
            .bind(&form.audience_type)
            .bind(&form.audience_characteristics)
            .bind(&form.age_range)
            .bind(&form.gender)
            .bind(&form.location)
            .bind(&form.language)
            .bind(&form.budget_type)
            .bind(form.budget_amount.unwrap_or_default())
            .bind(form.start_date)
            .bind(form.end_date)
            .bind(&form.optimization_preference)
            .bind(&form.content_idea)
            .bind(&form.brand_tone)
            .bind(&form.cta_objective)
            .bind(&form.visual_style)
            .bind(form.generate_ad_copy)
            .bind(form.generate_headlines)
            .bind(form.generate_cta_text)
            .bind(form.generate_image_prompt)
            .bind(form.generate_video_hooks)
            .bind(form.number_of_variations)
            .bind(PAID_STATUS_DRAFT)
            .fetch_one(pool)
            .await
    }

    /// Store generated content and move the row to `status`.
    pub async fn record_generated(
        pool: &PgPool,
        user_id: UserId,
        id: DbId,
        content: &GeneratedAdContent,
        status: &str,
    ) -> Result<Option<PaidContent>, sqlx::Error> {
        let query = format!(
            "UPDATE paid_content SET
                generated_ad_copy = $3,
                generated_headlines = $4,
                generated_cta_suggestions = $5,
                generated_image_prompt = $6,
                generated_video_hooks = $7,
                status = $8,
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaidContent>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&content.ad_copy)
            .bind(Json(&content.headlines))
            .bind(Json(&content.cta_suggestions))
            .bind(&content.image_prompt)
            .bind(Json(&content.video_hooks))
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_status(
        pool: &PgPool,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<Option<PaidContent>, sqlx::Error> {
        let query = format!(
            "UPDATE paid_content SET status = $3, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaidContent>(&query)
            .bind(id)
            .bind(user_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for_user(
        pool: &PgPool,
        user_id: UserId,
        id: DbId,
    ) -> Result<Option<PaidContent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM paid_content WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, PaidContent>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
