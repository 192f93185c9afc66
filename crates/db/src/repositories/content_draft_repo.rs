//! Repository for the `content_drafts` table.

use postforge_core::content::{MediaKind, STATUS_CONTENT_GENERATED};
use postforge_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::content_draft::{
    uploaded_column, ContentDraft, CreateContentDraft, RecordGeneratedContent,
};

/// Column list for content_drafts queries.
const COLUMNS: &str = "id, user_id, created_at, idea, platform, format, asset_source, \
    knowledge_base_file_name, asset_file_name, status, generated_text, generated_image_url, \
    generated_video_url, uploaded_image_url, uploaded_video_url, media_ready, generated_at";

/// Provides CRUD operations for content drafts.
pub struct ContentDraftRepo;

impl ContentDraftRepo {
    /// Insert a new draft with status `draft_created`, returning the row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContentDraft,
    ) -> Result<ContentDraft, sqlx::Error> {
        let query = format!(
            "INSERT INTO content_drafts
                (user_id, idea, platform, format, asset_source, knowledge_base_file_name,
                 asset_file_name, uploaded_image_url, uploaded_video_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(input.user_id)
            .bind(&input.idea)
            .bind(&input.platform)
            .bind(&input.format)
            .bind(&input.asset_source)
            .bind(&input.knowledge_base_file_name)
            .bind(&input.asset_file_name)
            .bind(&input.uploaded_image_url)
            .bind(&input.uploaded_video_url)
            .fetch_one(pool)
            .await
    }

    /// Find a draft by id, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: UserId,
        id: DbId,
    ) -> Result<Option<ContentDraft>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_drafts WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's most recently created draft.
    pub async fn find_latest_for_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Option<ContentDraft>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_drafts
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Write webhook output onto a draft and mark it `content_generated`.
    ///
    /// `None` fields keep the stored value. `media_ready` only ever flips
    /// on. Returns `None` when the draft does not exist.
    pub async fn record_generated(
        pool: &PgPool,
        id: DbId,
        input: &RecordGeneratedContent,
    ) -> Result<Option<ContentDraft>, sqlx::Error> {
        let query = format!(
            "UPDATE content_drafts SET
                generated_text = COALESCE($2, generated_text),
                generated_image_url = COALESCE($3, generated_image_url),
                generated_video_url = COALESCE($4, generated_video_url),
                media_ready = media_ready OR $5,
                status = $6,
                generated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(id)
            .bind(&input.generated_text)
            .bind(&input.generated_image_url)
            .bind(&input.generated_video_url)
            .bind(input.mark_media_ready)
            .bind(STATUS_CONTENT_GENERATED)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a draft's status tag. Returns `true` if a row was updated.
    pub async fn set_status(
        pool: &PgPool,
        user_id: UserId,
        id: DbId,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE content_drafts SET status = $3 WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .bind(status)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Point the draft's uploaded image or video column at a stored object.
    pub async fn attach_uploaded_media(
        pool: &PgPool,
        user_id: UserId,
        id: DbId,
        kind: MediaKind,
        url: &str,
    ) -> Result<Option<ContentDraft>, sqlx::Error> {
        let column = uploaded_column(kind);
        let query = format!(
            "UPDATE content_drafts SET {column} = $3
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentDraft>(&query)
            .bind(id)
            .bind(user_id)
            .bind(url)
            .fetch_optional(pool)
            .await
    }
}
