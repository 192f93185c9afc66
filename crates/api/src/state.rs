use std::sync::Arc;

use postforge_cloud::{AuthContext, BackendStorage, IdentityClient, ObjectStore};
use postforge_events::{EventBus, WebhookClient};
use postforge_pipeline::approval::ApprovalService;
use postforge_pipeline::generation::GenerationPipeline;
use postforge_pipeline::history::HistoryService;
use postforge_pipeline::hooks::{ApprovalHook, GenerationHook, HttpHooks};
use postforge_pipeline::paid::PaidContentService;
use postforge_pipeline::store::{CampaignStore, DraftStore, PaidContentStore, PgStore};
use postforge_pipeline::upload::AssetUploadService;
use postforge_pipeline::BackgroundTasks;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::error::AppError;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks).
    pub pool: postforge_db::DbPool,
    pub config: Arc<AppConfig>,
    pub event_bus: Arc<EventBus>,
    pub identity: IdentityClient,
    pub auth_context: Arc<AuthContext>,
    /// Late webhook writes and approval notifications.
    pub background: BackgroundTasks,
    pub generation: Arc<GenerationPipeline>,
    pub uploads: Arc<AssetUploadService>,
    pub approvals: Arc<ApprovalService>,
    pub history: Arc<HistoryService>,
    pub paid_content: Arc<PaidContentService>,
}

/// The outside world the workflows talk to.
pub struct Backends {
    pub drafts: Arc<dyn DraftStore>,
    pub campaigns: Arc<dyn CampaignStore>,
    pub paid_content: Arc<dyn PaidContentStore>,
    pub generation_hook: Arc<dyn GenerationHook>,
    pub approval_hook: Arc<dyn ApprovalHook>,
    pub objects: Arc<dyn ObjectStore>,
    pub identity: IdentityClient,
}

impl Backends {
    /// Postgres stores, HTTP webhooks, and the hosted backend's REST APIs.
    pub fn live(pool: &postforge_db::DbPool, config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::new();
        let store = Arc::new(PgStore::new(pool.clone()));

        let webhooks = WebhookClient::new(config.workflow.webhook_hard_timeout())
            .map_err(|e| AppError::InternalError(format!("webhook client: {e}")))?;
        let hooks = Arc::new(HttpHooks::new(
            webhooks,
            config.workflow.generation_webhook_url.clone(),
            config.workflow.approval_webhook_url.clone(),
        ));

        let objects = BackendStorage::new(
            http.clone(),
            &config.backend.url,
            config.backend.anon_key.clone(),
            config.backend.storage_bucket.clone(),
        )?;
        let identity = IdentityClient::with_client(
            http,
            config.backend.url.clone(),
            config.backend.anon_key.clone(),
        );

        Ok(Self {
            drafts: store.clone(),
            campaigns: store.clone(),
            paid_content: store,
            generation_hook: hooks.clone(),
            approval_hook: hooks,
            objects: Arc::new(objects),
            identity,
        })
    }
}

impl AppState {
    /// Wire the workflows. `cancel` is the process-wide shutdown token.
    pub fn new(
        pool: postforge_db::DbPool,
        config: AppConfig,
        backends: Backends,
        cancel: CancellationToken,
    ) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let background = BackgroundTasks::new(cancel);

        let generation = GenerationPipeline::new(
            backends.drafts.clone(),
            backends.generation_hook,
            event_bus.clone(),
            background.clone(),
            config.workflow.generation(),
        );
        let uploads = AssetUploadService::new(
            backends.objects,
            backends.drafts.clone(),
            event_bus.clone(),
        );
        let approvals = ApprovalService::new(
            backends.drafts,
            backends.approval_hook,
            event_bus.clone(),
            background.clone(),
            config.workflow.approval_redirect_delay_ms,
        );

        Self {
            pool,
            config: Arc::new(config),
            event_bus,
            identity: backends.identity,
            auth_context: Arc::new(AuthContext::new()),
            background,
            generation: Arc::new(generation),
            uploads: Arc::new(uploads),
            approvals: Arc::new(approvals),
            history: Arc::new(HistoryService::new(backends.campaigns)),
            paid_content: Arc::new(PaidContentService::new(backends.paid_content)),
        }
    }
}
