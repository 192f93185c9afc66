//! Paid-ad briefs with templated content generation.

use std::sync::Arc;

use postforge_core::error::CoreError;
use postforge_core::paid::{
    generate_ad_content, regenerate_field, AdField, PaidContentForm, PAID_STATUS_GENERATED,
    PAID_STATUS_SAVED,
};
use postforge_core::types::DbId;
use postforge_db::models::paid_content::PaidContent;

use crate::error::PipelineError;
use crate::store::PaidContentStore;
use crate::Actor;

pub struct PaidContentService {
    store: Arc<dyn PaidContentStore>,
}

impl PaidContentService {
    pub fn new(store: Arc<dyn PaidContentStore>) -> Self {
        Self { store }
    }

    /// Validate and persist the brief, then attach first-pass content.
    pub async fn create(
        &self,
        actor: &Actor,
        form: &PaidContentForm,
    ) -> Result<PaidContent, PipelineError> {
        form.validate()?;
        let row = self.store.create(actor.user_id, form).await?;
        let content = generate_ad_content(form);
        let row = self
            .store
            .record_generated(actor.user_id, row.id, &content, PAID_STATUS_GENERATED)
            .await?
            .ok_or(not_found(row.id))?;
        tracing::info!(paid_content_id = %row.id, user_id = %actor.user_id, "Paid content generated");
        Ok(row)
    }

    pub async fn save_draft(&self, actor: &Actor, id: DbId) -> Result<PaidContent, PipelineError> {
        let row = self
            .store
            .set_status(actor.user_id, id, PAID_STATUS_SAVED)
            .await?
            .ok_or(not_found(id))?;
        tracing::info!(paid_content_id = %id, "Paid content saved");
        Ok(row)
    }

    /// Replace one generated field with its alternate template.
    pub async fn regenerate(
        &self,
        actor: &Actor,
        id: DbId,
        field: AdField,
    ) -> Result<PaidContent, PipelineError> {
        let row = self
            .store
            .find_for_user(actor.user_id, id)
            .await?
            .ok_or(not_found(id))?;
        let current = row.generated().ok_or_else(|| {
            CoreError::Conflict("Content has not been generated yet".to_string())
        })?;

        let next = regenerate_field(&row.form(), &current, field);
        let row = self
            .store
            .record_generated(actor.user_id, id, &next, &row.status)
            .await?
            .ok_or(not_found(id))?;
        tracing::info!(paid_content_id = %id, ?field, "Paid content field regenerated");
        Ok(row)
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "paid_content",
        id,
    }
}
