//! Handlers for the `/auth` resource.
//!
//! Credentials never touch this server's storage: sign-up, sign-in, and
//! sign-out are forwarded to the hosted identity provider, and the
//! resulting users are tracked in the process-wide `AuthContext`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use postforge_cloud::{Session, SessionUser, SignUpResult};
use postforge_events::{event_types, PlatformEvent};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Please enter your name"))]
    pub name: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter your password"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user: SessionUser,
    pub display_name: String,
    /// `None` while the provider waits for email confirmation.
    pub session: Option<Session>,
    pub confirmation_required: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Session,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub user: SessionUser,
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SignUpResponse>>)> {
    input.validate()?;
    let name = input.name.trim();

    let result = state
        .identity
        .sign_up(input.email.trim(), &input.password, name)
        .await?;
    let user = result.user().clone();
    tracing::info!(user_id = %user.id, "Account created");

    let session = match result {
        SignUpResult::Session(session) => {
            record_sign_in(&state, &session.user).await;
            Some(session)
        }
        SignUpResult::PendingConfirmation(_) => None,
    };

    let response = SignUpResponse {
        display_name: user.display_name(),
        confirmation_required: session.is_none(),
        session,
        user,
    };
    Ok((StatusCode::CREATED, DataResponse::new(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<SessionResponse>>> {
    input.validate()?;
    let session = state
        .identity
        .sign_in(input.email.trim(), &input.password)
        .await?;
    record_sign_in(&state, &session.user).await;

    Ok(DataResponse::new(SessionResponse {
        display_name: session.user.display_name(),
        session,
    }))
}

/// POST /api/v1/auth/logout
///
/// Revokes the caller's session at the provider, then forgets the user.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    state.identity.sign_out(&user.access_token).await?;
    state.auth_context.signed_out(user.user_id).await;
    state.event_bus.publish(PlatformEvent::new(event_types::AUTH_SIGNED_OUT).with_actor(user.user_id));
    tracing::info!(user_id = %user.user_id, "User signed out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
pub async fn session(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<CurrentUser>>> {
    let current = state.identity.get_user(&user.access_token).await?;
    state.auth_context.signed_in(current.clone()).await;
    Ok(DataResponse::new(CurrentUser {
        display_name: current.display_name(),
        user: current,
    }))
}

async fn record_sign_in(state: &AppState, user: &SessionUser) {
    state.auth_context.signed_in(user.clone()).await;
    state
        .event_bus
        .publish(PlatformEvent::new(event_types::AUTH_SIGNED_IN).with_actor(user.id));
    tracing::info!(user_id = %user.id, "User signed in");
}
