//! Campaign history: listing with search and filters, plus campaign edits.
//!
//! Each user has one history session holding the last fetched set. Filters
//! and expand toggles run against that set; only a search (or a refresh,
//! which is a blank search) goes back to storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use postforge_core::content::Platform;
use postforge_core::error::CoreError;
use postforge_core::history::{empty_message, HistoryFilter, HistorySession};
use postforge_core::types::{DbId, UserId};
use postforge_db::models::campaign::{
    Campaign, CampaignContent, CampaignWithContent, CreateCampaign, CreateCampaignContent,
};
use serde::Serialize;

use crate::error::PipelineError;
use crate::store::CampaignStore;
use crate::Actor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub campaign: CampaignWithContent,
    /// Comma-separated platform labels, e.g. `"Facebook, X"`.
    pub platforms: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub campaigns: Vec<HistoryEntry>,
    /// Search term that produced the cached set.
    pub search: Option<String>,
    pub expanded: Option<DbId>,
    /// Set only when `campaigns` is empty.
    pub empty_message: Option<&'static str>,
}

type Session = HistorySession<CampaignWithContent>;

#[derive(Default)]
struct HistorySessions {
    sessions: Mutex<HashMap<UserId, Session>>,
}

impl HistorySessions {
    fn with<R>(&self, user_id: UserId, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        f(sessions.entry(user_id).or_default())
    }
}

pub struct HistoryService {
    campaigns: Arc<dyn CampaignStore>,
    sessions: HistorySessions,
}

impl HistoryService {
    pub fn new(campaigns: Arc<dyn CampaignStore>) -> Self {
        Self {
            campaigns,
            sessions: HistorySessions::default(),
        }
    }

    /// Apply `filter` to the caller's cached set. The set is fetched only
    /// when the session has none yet.
    pub async fn list(
        &self,
        actor: &Actor,
        filter: &HistoryFilter,
    ) -> Result<HistoryPage, PipelineError> {
        let fetched = self.sessions.with(actor.user_id, |s| s.is_fetched());
        if !fetched {
            return self.search(actor, None, filter).await;
        }
        Ok(self.page(actor, filter))
    }

    /// Re-fetch the caller's campaigns, by name when `term` is non-blank,
    /// and replace the cached set.
    pub async fn search(
        &self,
        actor: &Actor,
        term: Option<&str>,
        filter: &HistoryFilter,
    ) -> Result<HistoryPage, PipelineError> {
        let term = term.map(str::trim).filter(|t| !t.is_empty());
        let fetched = match term {
            Some(term) => self.campaigns.search_by_name(actor.user_id, term).await?,
            None => self.campaigns.list_for_user(actor.user_id).await?,
        };
        tracing::debug!(
            user_id = %actor.user_id,
            search = term.unwrap_or_default(),
            fetched = fetched.len(),
            "History fetched",
        );
        self.sessions
            .with(actor.user_id, |s| s.replace(term, fetched));
        Ok(self.page(actor, filter))
    }

    /// Expand a cached row, collapsing any other; collapse it if already
    /// expanded.
    pub fn toggle_expanded(
        &self,
        actor: &Actor,
        campaign_id: DbId,
        filter: &HistoryFilter,
    ) -> Result<HistoryPage, PipelineError> {
        let known = self
            .sessions
            .with(actor.user_id, |s| s.toggle(campaign_id));
        if !known {
            return Err(CoreError::NotFound {
                entity: "campaign",
                id: campaign_id,
            }
            .into());
        }
        Ok(self.page(actor, filter))
    }

    fn page(&self, actor: &Actor, filter: &HistoryFilter) -> HistoryPage {
        let (rows, search, expanded) = self.sessions.with(actor.user_id, |s| {
            (
                s.visible(filter),
                s.search_term().map(str::to_string),
                s.expanded(),
            )
        });
        let campaigns: Vec<HistoryEntry> = rows
            .into_iter()
            .map(|campaign| HistoryEntry {
                platforms: campaign.platforms_list(),
                campaign,
            })
            .collect();
        let empty_message = campaigns
            .is_empty()
            .then(|| empty_message(search.as_deref()));
        HistoryPage {
            campaigns,
            search,
            expanded,
            empty_message,
        }
    }

    pub async fn create_campaign(
        &self,
        actor: &Actor,
        input: CreateCampaign,
    ) -> Result<Campaign, PipelineError> {
        let input = CreateCampaign {
            campaign_name: required("campaign_name", &input.campaign_name)?,
            content_idea: required("content_idea", &input.content_idea)?,
            knowledge_base_file: input.knowledge_base_file,
        };
        let campaign = self.campaigns.create(actor.user_id, &input).await?;
        tracing::info!(campaign_id = %campaign.id, user_id = %actor.user_id, "Campaign created");
        Ok(campaign)
    }

    /// Add one platform's content. The platform is normalized to its slug.
    pub async fn add_content(
        &self,
        actor: &Actor,
        campaign_id: DbId,
        input: CreateCampaignContent,
    ) -> Result<CampaignContent, PipelineError> {
        let platform: Platform = input.platform.parse()?;
        self.campaigns
            .find_for_user(actor.user_id, campaign_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "campaign",
                id: campaign_id,
            })?;

        let input = CreateCampaignContent {
            platform: platform.slug().to_string(),
            ..input
        };
        let content = self.campaigns.add_content(campaign_id, &input).await?;
        tracing::info!(%campaign_id, platform = platform.slug(), "Campaign content added");
        Ok(content)
    }

    pub async fn update_status(
        &self,
        actor: &Actor,
        campaign_id: DbId,
        status: &str,
    ) -> Result<Campaign, PipelineError> {
        let status = required("status", status)?;
        let campaign = self
            .campaigns
            .update_status(actor.user_id, campaign_id, &status)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "campaign",
                id: campaign_id,
            })?;
        tracing::info!(%campaign_id, %status, "Campaign status updated");
        Ok(campaign)
    }
}

fn required(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeZone, Utc};
    use postforge_core::history::{EMPTY_HISTORY_MESSAGE, EMPTY_SEARCH_MESSAGE};
    use uuid::Uuid;

    use super::*;
    use crate::testing::MemoryCampaignStore;

    fn actor() -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            email: "h@example.com".into(),
        }
    }

    fn seeded(store: &MemoryCampaignStore, a: &Actor, name: &str, day: u32, status: &str) -> DbId {
        let at = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        let id = Uuid::new_v4();
        store.insert(CampaignWithContent {
            campaign: Campaign {
                id,
                user_id: a.user_id,
                campaign_name: name.into(),
                content_idea: "idea".into(),
                knowledge_base_file: None,
                status: status.into(),
                created_at: at,
                updated_at: at,
            },
            campaign_content: Vec::new(),
        });
        id
    }

    fn service() -> (HistoryService, Arc<MemoryCampaignStore>) {
        let store = Arc::new(MemoryCampaignStore::new());
        (HistoryService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_list_newest_first_with_platform_labels() {
        let (svc, store) = service();
        let a = actor();
        seeded(&store, &a, "Old", 1, "approved");
        let newest = seeded(&store, &a, "New", 5, "approved");
        for slug in ["facebook", "x"] {
            svc.add_content(
                &a,
                newest,
                CreateCampaignContent {
                    platform: slug.into(),
                    text_content: Some("t".into()),
                    image_link: None,
                    video_link: None,
                },
            )
            .await
            .unwrap();
        }

        let page = svc.list(&a, &HistoryFilter::default()).await.unwrap();

        assert_eq!(page.campaigns.len(), 2);
        assert_eq!(page.campaigns[0].campaign.campaign.id, newest);
        assert_eq!(page.campaigns[0].platforms, "Facebook, X");
        assert_eq!(page.empty_message, None);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_scoped() {
        let (svc, store) = service();
        let a = actor();
        seeded(&store, &a, "Spring Launch", 1, "draft");
        seeded(&store, &a, "Winter", 2, "draft");
        seeded(&store, &actor(), "spring other user", 3, "draft");

        let page = svc
            .search(&a, Some("SPRING"), &HistoryFilter::default())
            .await
            .unwrap();

        assert_eq!(page.campaigns.len(), 1);
        assert_eq!(page.campaigns[0].campaign.campaign.campaign_name, "Spring Launch");
        assert_eq!(page.search.as_deref(), Some("SPRING"));
    }

    #[tokio::test]
    async fn test_filters_apply_to_fetched_set() {
        let (svc, store) = service();
        let a = actor();
        seeded(&store, &a, "A", 1, "approved");
        seeded(&store, &a, "B", 10, "approved");
        seeded(&store, &a, "C", 10, "draft");

        let filter = HistoryFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            status: Some("approved".into()),
        };
        let page = svc.list(&a, &filter).await.unwrap();

        assert_eq!(page.campaigns.len(), 1);
        assert_eq!(page.campaigns[0].campaign.campaign.campaign_name, "B");
    }

    #[tokio::test]
    async fn test_filter_change_does_not_refetch() {
        let (svc, store) = service();
        let a = actor();
        seeded(&store, &a, "A", 1, "approved");
        seeded(&store, &a, "B", 2, "draft");
        let page = svc.list(&a, &HistoryFilter::default()).await.unwrap();
        assert_eq!(page.campaigns.len(), 2);

        let late = seeded(&store, &a, "Late", 3, "approved");
        let approved = HistoryFilter {
            status: Some("approved".into()),
            ..Default::default()
        };
        let page = svc.list(&a, &approved).await.unwrap();
        assert_eq!(page.campaigns.len(), 1);
        assert_eq!(page.campaigns[0].campaign.campaign.campaign_name, "A");
        let page = svc.list(&a, &HistoryFilter::default()).await.unwrap();
        assert_eq!(page.campaigns.len(), 2);

        // A blank search is a refresh.
        let page = svc.search(&a, Some("  "), &approved).await.unwrap();
        assert_eq!(page.campaigns.len(), 2);
        assert_eq!(page.campaigns[0].campaign.campaign.id, late);
    }

    #[tokio::test]
    async fn test_filters_keep_search_results() {
        let (svc, store) = service();
        let a = actor();
        seeded(&store, &a, "Spring Launch", 1, "approved");
        seeded(&store, &a, "Winter", 2, "approved");
        svc.search(&a, Some("spring"), &HistoryFilter::default())
            .await
            .unwrap();

        let page = svc.list(&a, &HistoryFilter::default()).await.unwrap();

        assert_eq!(page.campaigns.len(), 1);
        assert_eq!(page.search.as_deref(), Some("spring"));
    }

    #[tokio::test]
    async fn test_toggle_expanded_single_row() {
        let (svc, store) = service();
        let a = actor();
        let first = seeded(&store, &a, "A", 1, "draft");
        let second = seeded(&store, &a, "B", 2, "draft");
        let none = HistoryFilter::default();

        let err = svc.toggle_expanded(&a, first, &none).unwrap_err();
        assert_matches!(err, PipelineError::Core(CoreError::NotFound { .. }));

        svc.list(&a, &none).await.unwrap();
        assert_eq!(svc.toggle_expanded(&a, first, &none).unwrap().expanded, Some(first));
        assert_eq!(svc.toggle_expanded(&a, second, &none).unwrap().expanded, Some(second));
        assert_eq!(svc.toggle_expanded(&a, second, &none).unwrap().expanded, None);

        let other = actor();
        svc.list(&other, &none).await.unwrap();
        assert!(svc.toggle_expanded(&other, first, &none).is_err());
    }

    #[tokio::test]
    async fn test_empty_messages() {
        let (svc, _) = service();
        let a = actor();
        let page = svc.list(&a, &HistoryFilter::default()).await.unwrap();
        assert_eq!(page.empty_message, Some(EMPTY_HISTORY_MESSAGE));
        let page = svc
            .search(&a, Some("nope"), &HistoryFilter::default())
            .await
            .unwrap();
        assert_eq!(page.empty_message, Some(EMPTY_SEARCH_MESSAGE));
    }

    #[tokio::test]
    async fn test_create_campaign_requires_name() {
        let (svc, _) = service();
        let err = svc
            .create_campaign(
                &actor(),
                CreateCampaign {
                    campaign_name: "  ".into(),
                    content_idea: "idea".into(),
                    knowledge_base_file: None,
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, PipelineError::Core(CoreError::Validation(m)) if m.contains("campaign_name"));
    }

    #[tokio::test]
    async fn test_add_content_to_foreign_campaign_is_not_found() {
        let (svc, store) = service();
        let id = seeded(&store, &actor(), "Theirs", 1, "draft");
        let err = svc
            .add_content(
                &actor(),
                id,
                CreateCampaignContent {
                    platform: "instagram".into(),
                    text_content: None,
                    image_link: None,
                    video_link: None,
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, PipelineError::Core(CoreError::NotFound { entity: "campaign", .. }));
    }

    #[tokio::test]
    async fn test_add_content_rejects_unknown_platform() {
        let (svc, store) = service();
        let a = actor();
        let id = seeded(&store, &a, "Mine", 1, "draft");
        let err = svc
            .add_content(
                &a,
                id,
                CreateCampaignContent {
                    platform: "myspace".into(),
                    text_content: None,
                    image_link: None,
                    video_link: None,
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, PipelineError::Core(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_status_touches_row() {
        let (svc, store) = service();
        let a = actor();
        let id = seeded(&store, &a, "Mine", 1, "draft");

        let updated = svc.update_status(&a, id, "approved").await.unwrap();

        assert_eq!(updated.status, "approved");
        assert!(updated.updated_at > updated.created_at);
        assert!(svc.update_status(&actor(), id, "draft").await.is_err());
    }
}
