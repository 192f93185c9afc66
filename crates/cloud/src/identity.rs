//! REST client for the hosted identity provider.
//!
//! Speaks the provider's `/auth/v1` endpoints: password sign-up, password
//! token grant, logout, and user lookup. Every request carries the
//! project's anon key in the `apikey` header; user-scoped calls also send
//! the user's access token as a bearer token.

use postforge_core::types::UserId;
use serde::{Deserialize, Serialize};

use crate::error::{provider_message, CloudError};

const SERVICE: &str = "authentication";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The signed-in user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl SessionUser {
    /// Greeting name: `display_name`, then `full_name`, then the local part
    /// of the email, then `"User"`.
    pub fn display_name(&self) -> String {
        let from_metadata = |key: &str| {
            self.user_metadata
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        from_metadata("display_name")
            .or_else(|| from_metadata("full_name"))
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string())
    }
}

/// Access/refresh token pair for a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: SessionUser,
}

/// Sign-up returns a session when the project auto-confirms accounts,
/// and only the user when email confirmation is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignUpResult {
    Session(Session),
    PendingConfirmation(SessionUser),
}

impl SignUpResult {
    pub fn user(&self) -> &SessionUser {
        match self {
            SignUpResult::Session(s) => &s.user,
            SignUpResult::PendingConfirmation(u) => u,
        }
    }
}

// ---------------------------------------------------------------------------
// IdentityClient
// ---------------------------------------------------------------------------

/// HTTP client for the identity provider of one hosted project.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl IdentityClient {
    /// * `base_url` - project URL, e.g. `https://abc.example.co`.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, anon_key)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Create an account. `name` is stored as both `display_name` and
    /// `full_name` metadata.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpResult, CloudError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": {
                "display_name": name,
                "full_name": name,
            },
        });
        let response = self
            .client
            .post(self.url("/auth/v1/signup"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;
        parse_json(response, "Failed to create account").await
    }

    /// Password sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, CloudError> {
        let response = self
            .client
            .post(self.url("/auth/v1/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(unavailable)?;
        parse_json(response, "Failed to sign in").await
    }

    /// Revoke the session behind `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), CloudError> {
        let response = self
            .client
            .post(self.url("/auth/v1/logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(unavailable)?;
        ensure_success(response, "Failed to sign out").await?;
        Ok(())
    }

    /// Fetch the user that owns `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<SessionUser, CloudError> {
        let response = self
            .client
            .get(self.url("/auth/v1/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(unavailable)?;
        parse_json(response, "Failed to load user").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

// ---- private helpers ----

fn unavailable(source: reqwest::Error) -> CloudError {
    tracing::warn!(error = %source, "Identity provider unreachable");
    CloudError::Unavailable {
        service: SERVICE,
        source,
    }
}

async fn ensure_success(
    response: reqwest::Response,
    fallback: &str,
) -> Result<reqwest::Response, CloudError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = provider_message(&body).unwrap_or_else(|| fallback.to_string());
    tracing::warn!(status = status.as_u16(), %message, "Identity provider rejected request");
    Err(CloudError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, CloudError> {
    let response = ensure_success(response, fallback).await?;
    let body = response.text().await.map_err(unavailable)?;
    serde_json::from_str(&body).map_err(|e| CloudError::InvalidResponse {
        service: SERVICE,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use uuid::Uuid;

    use super::*;

    fn user(metadata: serde_json::Value, email: Option<&str>) -> SessionUser {
        SessionUser {
            id: Uuid::from_u128(1),
            email: email.map(str::to_string),
            user_metadata: metadata,
        }
    }

    #[test]
    fn test_display_name_fallback_chain() {
        let both = serde_json::json!({"display_name": "Dee", "full_name": "Dee Full"});
        assert_eq!(user(both, Some("d@x.io")).display_name(), "Dee");

        let full = serde_json::json!({"full_name": "Dee Full"});
        assert_eq!(user(full, Some("d@x.io")).display_name(), "Dee Full");

        assert_eq!(user(serde_json::json!({}), Some("dana@x.io")).display_name(), "dana");
        assert_eq!(user(serde_json::Value::Null, None).display_name(), "User");
    }

    #[test]
    fn test_sign_up_result_shapes() {
        let id = Uuid::new_v4();
        let session: SignUpResult = serde_json::from_value(serde_json::json!({
            "access_token": "t",
            "user": {"id": id, "email": "a@b.c"}
        }))
        .unwrap();
        assert_matches!(session, SignUpResult::Session(_));

        let pending: SignUpResult =
            serde_json::from_value(serde_json::json!({"id": id, "email": "a@b.c"})).unwrap();
        assert_matches!(pending, SignUpResult::PendingConfirmation(_));
        assert_eq!(pending.user().id, id);
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_sign_in_sends_grant_type_and_apikey() {
        let id = Uuid::new_v4();
        let router = Router::new().route(
            "/auth/v1/token",
            post(
                move |Query(q): Query<std::collections::HashMap<String, String>>,
                      headers: HeaderMap,
                      Json(body): Json<serde_json::Value>| async move {
                    if q.get("grant_type").map(String::as_str) != Some("password")
                        || headers.get("apikey").is_none()
                    {
                        return (StatusCode::BAD_REQUEST, Json(serde_json::json!({"msg": "bad"})));
                    }
                    (
                        StatusCode::OK,
                        Json(serde_json::json!({
                            "access_token": "tok",
                            "token_type": "bearer",
                            "user": {"id": id, "email": body["email"]}
                        })),
                    )
                },
            ),
        );
        let base = serve(router).await;
        let client = IdentityClient::new(base, "anon");
        let session = client.sign_in("a@b.c", "pw").await.unwrap();
        assert_eq!(session.access_token, "tok");
        assert_eq!(session.user.id, id);
        assert_eq!(session.user.email.as_deref(), Some("a@b.c"));
    }

    #[tokio::test]
    async fn test_provider_error_message_surfaces() {
        let router = Router::new().route(
            "/auth/v1/token",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": "invalid_grant", "error_description": "Invalid login credentials"})),
                )
            }),
        );
        let base = serve(router).await;
        let err = IdentityClient::new(base, "anon")
            .sign_in("a@b.c", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_get_user_requires_bearer() {
        let id = Uuid::new_v4();
        let router = Router::new().route(
            "/auth/v1/user",
            get(move |headers: HeaderMap| async move {
                match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                    Some("Bearer tok") => (StatusCode::OK, Json(serde_json::json!({"id": id}))),
                    _ => (StatusCode::UNAUTHORIZED, Json(serde_json::json!({"msg": "no"}))),
                }
            }),
        );
        let base = serve(router).await;
        let client = IdentityClient::new(base, "anon");
        assert_eq!(client.get_user("tok").await.unwrap().id, id);
        assert_eq!(client.get_user("bad").await.unwrap_err().status(), Some(401));
    }

    #[tokio::test]
    async fn test_unreachable_provider_message() {
        let err = IdentityClient::new("http://127.0.0.1:1", "anon")
            .sign_up("a@b.c", "pw", "A")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to connect to authentication service. Please check your internet connection and try again."
        );
    }
}
