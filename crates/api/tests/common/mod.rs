#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Query;
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get as route_get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use postforge_api::auth::jwt::{Claims, JwtConfig, AUTHENTICATED_AUDIENCE};
use postforge_api::config::{AppConfig, BackendConfig, ServerConfig, WorkflowConfig};
use postforge_api::router::build_app_router;
use postforge_api::state::{AppState, Backends};
use postforge_cloud::IdentityClient;
use postforge_core::contract::ResponseContract;
use postforge_core::types::UserId;
use postforge_pipeline::store::PgStore;
use postforge_pipeline::testing::{MemoryObjectStore, RecordingApprovalHook, ScriptedHook};
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-integration-tests";

/// Password the mock identity provider accepts.
pub const GOOD_PASSWORD: &str = "correct-horse";

/// Webhook body that yields text and an image.
pub const GENERATED_BODY: &str =
    r#"[{"facebookOutput":["Fresh pumpkin soup is back!"],"url":["https://cdn.test/soup.png"]}]"#;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
    }
}

fn app_config(identity_url: &str) -> AppConfig {
    AppConfig {
        server: test_config(),
        backend: BackendConfig {
            database_url: "postgres://unused".to_string(),
            url: identity_url.to_string(),
            anon_key: "test-anon-key".to_string(),
            jwt: JwtConfig::new(TEST_JWT_SECRET),
            storage_bucket: "content-assets".to_string(),
        },
        workflow: WorkflowConfig {
            generation_webhook_url: "http://unused/generate".to_string(),
            approval_webhook_url: "http://unused/approve".to_string(),
            generation_timeout_secs: 20,
            webhook_hard_timeout_secs: 60,
            approval_redirect_delay_ms: 1500,
            response_contract: ResponseContract::v1(),
        },
    }
}

/// The application plus handles on its scripted collaborators.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub generation_hook: Arc<ScriptedHook>,
    pub approval_hook: Arc<RecordingApprovalHook>,
    pub objects: Arc<MemoryObjectStore>,
}

/// Build the full application against the test database, a local mock
/// identity provider, and a webhook that answers with [`GENERATED_BODY`].
pub async fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(pool, ScriptedHook::responding(GENERATED_BODY)).await
}

pub async fn build_test_app_with(pool: PgPool, generation_hook: ScriptedHook) -> TestApp {
    let identity_url = spawn_identity_provider().await;
    let config = app_config(&identity_url);

    let store = Arc::new(PgStore::new(pool.clone()));
    let generation_hook = Arc::new(generation_hook);
    let approval_hook = Arc::new(RecordingApprovalHook::new());
    let objects = Arc::new(MemoryObjectStore::new());

    let backends = Backends {
        drafts: store.clone(),
        campaigns: store.clone(),
        paid_content: store,
        generation_hook: generation_hook.clone(),
        approval_hook: approval_hook.clone(),
        objects: objects.clone(),
        identity: IdentityClient::new(identity_url, "test-anon-key"),
    };

    let server = config.server.clone();
    let state = AppState::new(pool, config, backends, CancellationToken::new());
    let router = build_app_router(state.clone(), &server);

    TestApp {
        router,
        state,
        generation_hook,
        approval_hook,
        objects,
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Mint an access token the way the identity provider does.
pub fn mint_token(user_id: UserId, email: &str) -> String {
    let claims = Claims {
        sub: user_id,
        email: Some(email.to_string()),
        user_metadata: json!({ "display_name": "Test User" }),
        aud: AUTHENTICATED_AUDIENCE.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token encoding should succeed")
}

/// A fresh user id and a valid token for it.
pub fn new_user() -> (UserId, String) {
    let id = Uuid::new_v4();
    (id, mint_token(id, "owner@cafe.test"))
}

// ---------------------------------------------------------------------------
// Mock identity provider
// ---------------------------------------------------------------------------

fn provider_user(email: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "email": email,
        "user_metadata": { "full_name": "Test User" },
    })
}

fn provider_session(email: &str) -> Value {
    let user = provider_user(email);
    let id: Uuid = serde_json::from_value(user["id"].clone()).expect("uuid");
    json!({
        "access_token": mint_token(id, email),
        "refresh_token": "refresh",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": user,
    })
}

async fn provider_signup(Json(body): Json<Value>) -> Json<Value> {
    let email = body["email"].as_str().unwrap_or_default();
    if email.starts_with("confirm") {
        Json(provider_user(email))
    } else {
        Json(provider_session(email))
    }
}

async fn provider_token(
    Query(query): Query<std::collections::HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    assert_eq!(query.get("grant_type").map(String::as_str), Some("password"));
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] == GOOD_PASSWORD {
        Json(provider_session(email)).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" })),
        )
            .into_response()
    }
}

async fn provider_user_lookup(headers: axum::http::HeaderMap) -> Response {
    match headers.get(header::AUTHORIZATION) {
        Some(_) => Json(provider_user("owner@cafe.test")).into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "no token" }))).into_response(),
    }
}

/// Serve the provider's `/auth/v1` endpoints on an ephemeral port.
async fn spawn_identity_provider() -> String {
    let app = Router::new()
        .route("/auth/v1/signup", post(provider_signup))
        .route("/auth/v1/token", post(provider_token))
        .route("/auth/v1/logout", post(|| async { StatusCode::NO_CONTENT }))
        .route("/auth/v1/user", route_get(provider_user_lookup));

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind mock identity provider");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    send(app, request).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, request).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, request).await
}

pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response {
    let request = Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    send(app, request).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response {
    let request = Request::put(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

/// A brief for an image post on Facebook with AI-generated media.
pub fn image_brief() -> Value {
    json!({
        "idea": "Autumn menu launch",
        "platform": "Facebook",
        "format": "Image + Text",
        "asset_source": "AI Generate",
    })
}
