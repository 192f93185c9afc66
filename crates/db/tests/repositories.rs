//! Integration tests for the draft, campaign, and paid-content repositories.

use assert_matches::assert_matches;
use postforge_core::content::{MediaKind, STATUS_APPROVED, STATUS_CONTENT_GENERATED};
use postforge_core::paid::{generate_ad_content, PaidContentForm, PAID_STATUS_GENERATED};
use postforge_db::models::campaign::{CreateCampaign, CreateCampaignContent};
use postforge_db::models::content_draft::{CreateContentDraft, RecordGeneratedContent};
use postforge_db::repositories::{CampaignRepo, ContentDraftRepo, PaidContentRepo};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_draft(user_id: Uuid, idea: &str) -> CreateContentDraft {
    CreateContentDraft {
        user_id,
        idea: idea.to_string(),
        platform: "Instagram".to_string(),
        format: "Image + Text".to_string(),
        asset_source: Some("AI Generate".to_string()),
        ..Default::default()
    }
}

fn new_campaign(name: &str) -> CreateCampaign {
    CreateCampaign {
        campaign_name: name.to_string(),
        content_idea: "Launch week".to_string(),
        knowledge_base_file: None,
    }
}

fn paid_form() -> PaidContentForm {
    PaidContentForm {
        campaign_name: "Spring Sale".into(),
        primary_goal: "Sales".into(),
        target_platform: "Meta".into(),
        audience_type: "Warm".into(),
        audience_characteristics: "Returning shoppers".into(),
        budget_type: "Daily".into(),
        budget_amount: Some(25.0),
        optimization_preference: "Conversions".into(),
        content_idea: "20% off".into(),
        brand_tone: "Friendly".into(),
        cta_objective: "Buy Now".into(),
        visual_style: "Lifestyle".into(),
        number_of_variations: 3,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Content drafts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_draft_starts_at_draft_created(pool: PgPool) {
    let user = Uuid::new_v4();
    let draft = ContentDraftRepo::create(&pool, &new_draft(user, "Coffee launch"))
        .await
        .unwrap();
    assert_eq!(draft.status, "draft_created");
    assert_eq!(draft.user_id, user);
    assert!(!draft.media_ready);
    assert!(draft.generated_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_draft_is_scoped_to_user(pool: PgPool) {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    ContentDraftRepo::create(&pool, &new_draft(alice, "first")).await.unwrap();
    let second = ContentDraftRepo::create(&pool, &new_draft(alice, "second")).await.unwrap();
    ContentDraftRepo::create(&pool, &new_draft(bob, "other")).await.unwrap();

    let latest = ContentDraftRepo::find_latest_for_user(&pool, alice)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, second.id);

    let none = ContentDraftRepo::find_latest_for_user(&pool, Uuid::new_v4()).await.unwrap();
    assert!(none.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_generated_keeps_missing_fields(pool: PgPool) {
    let user = Uuid::new_v4();
    let draft = ContentDraftRepo::create(&pool, &new_draft(user, "idea")).await.unwrap();

    let first = RecordGeneratedContent {
        generated_text: Some("hello".into()),
        generated_image_url: Some("http://img/1.png".into()),
        generated_video_url: None,
        mark_media_ready: true,
    };
    ContentDraftRepo::record_generated(&pool, draft.id, &first).await.unwrap();

    let second = RecordGeneratedContent {
        generated_text: Some("updated".into()),
        ..Default::default()
    };
    let row = ContentDraftRepo::record_generated(&pool, draft.id, &second)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(row.status, STATUS_CONTENT_GENERATED);
    assert_eq!(row.generated_text.as_deref(), Some("updated"));
    assert_eq!(row.generated_image_url.as_deref(), Some("http://img/1.png"));
    assert!(row.media_ready);
    assert!(row.generated_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_record_generated_unknown_draft(pool: PgPool) {
    let row = ContentDraftRepo::record_generated(
        &pool,
        Uuid::new_v4(),
        &RecordGeneratedContent::default(),
    )
    .await
    .unwrap();
    assert!(row.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_status_requires_owner(pool: PgPool) {
    let user = Uuid::new_v4();
    let draft = ContentDraftRepo::create(&pool, &new_draft(user, "idea")).await.unwrap();

    let other = ContentDraftRepo::set_status(&pool, Uuid::new_v4(), draft.id, STATUS_APPROVED)
        .await
        .unwrap();
    assert!(!other);

    let owner = ContentDraftRepo::set_status(&pool, user, draft.id, STATUS_APPROVED)
        .await
        .unwrap();
    assert!(owner);

    let row = ContentDraftRepo::find_by_id(&pool, user, draft.id).await.unwrap().unwrap();
    assert_eq!(row.status, STATUS_APPROVED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attach_uploaded_video(pool: PgPool) {
    let user = Uuid::new_v4();
    let draft = ContentDraftRepo::create(&pool, &new_draft(user, "idea")).await.unwrap();
    let row = ContentDraftRepo::attach_uploaded_media(
        &pool,
        user,
        draft.id,
        MediaKind::Video,
        "http://storage/v.mp4",
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(row.uploaded_video_url.as_deref(), Some("http://storage/v.mp4"));
    assert!(row.uploaded_image_url.is_none());
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_campaign_listing_includes_content(pool: PgPool) {
    let user = Uuid::new_v4();
    let campaign = CampaignRepo::create(&pool, user, &new_campaign("Summer Launch"))
        .await
        .unwrap();
    assert_eq!(campaign.status, "draft");

    for platform in ["facebook", "x"] {
        CampaignRepo::add_content(
            &pool,
            campaign.id,
            &CreateCampaignContent {
                platform: platform.to_string(),
                text_content: Some("copy".into()),
                image_link: None,
                video_link: None,
            },
        )
        .await
        .unwrap();
    }

    let rows = CampaignRepo::list_for_user(&pool, user).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].campaign_content.len(), 2);
    assert_eq!(rows[0].platforms_list(), "Facebook, X");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_campaign_content_rejects_unknown_platform(pool: PgPool) {
    let user = Uuid::new_v4();
    let campaign = CampaignRepo::create(&pool, user, &new_campaign("C")).await.unwrap();
    let result = CampaignRepo::add_content(
        &pool,
        campaign.id,
        &CreateCampaignContent {
            platform: "tiktok".to_string(),
            text_content: None,
            image_link: None,
            video_link: None,
        },
    )
    .await;
    assert_matches!(result, Err(sqlx::Error::Database(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_is_case_insensitive_and_literal(pool: PgPool) {
    let user = Uuid::new_v4();
    CampaignRepo::create(&pool, user, &new_campaign("Spring SALE")).await.unwrap();
    CampaignRepo::create(&pool, user, &new_campaign("50% Off Friday")).await.unwrap();
    CampaignRepo::create(&pool, Uuid::new_v4(), &new_campaign("spring sale")).await.unwrap();

    let hits = CampaignRepo::search_by_name(&pool, user, "sale").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].campaign.campaign_name, "Spring SALE");

    let percent = CampaignRepo::search_by_name(&pool, user, "%").await.unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].campaign.campaign_name, "50% Off Friday");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_campaign_status(pool: PgPool) {
    let user = Uuid::new_v4();
    let campaign = CampaignRepo::create(&pool, user, &new_campaign("C")).await.unwrap();

    let foreign = CampaignRepo::update_status(&pool, Uuid::new_v4(), campaign.id, "approved")
        .await
        .unwrap();
    assert!(foreign.is_none());

    let updated = CampaignRepo::update_status(&pool, user, campaign.id, "approved")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "approved");
    assert!(updated.updated_at >= campaign.updated_at);
}

// ---------------------------------------------------------------------------
// Paid content
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_paid_content_lifecycle(pool: PgPool) {
    let user = Uuid::new_v4();
    let form = paid_form();
    let row = PaidContentRepo::create(&pool, user, &form).await.unwrap();
    assert_eq!(row.status, "draft");
    assert!(row.generated().is_none());
    assert_eq!(row.form().campaign_name, "Spring Sale");

    let content = generate_ad_content(&form);
    let row = PaidContentRepo::record_generated(&pool, user, row.id, &content, PAID_STATUS_GENERATED)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, PAID_STATUS_GENERATED);
    assert_eq!(row.generated(), Some(content));

    let missing = PaidContentRepo::find_for_user(&pool, Uuid::new_v4(), row.id).await.unwrap();
    assert!(missing.is_none());
}
