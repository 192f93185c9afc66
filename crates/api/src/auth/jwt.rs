//! Validation of access tokens issued by the hosted identity provider.
//!
//! The provider signs HS256 JWTs with the project's JWT secret and the
//! audience `authenticated`. This server never issues tokens; it only
//! checks them.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use postforge_core::types::UserId;
use serde::{Deserialize, Serialize};

/// Audience the provider stamps on signed-in users' tokens.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Claims read from a provider access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the provider's user id.
    pub sub: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    pub aud: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Configuration for token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity provider.
    pub secret: String,
    pub audience: String,
}

impl JwtConfig {
    /// Load from `BACKEND_JWT_SECRET`.
    ///
    /// # Panics
    ///
    /// Panics if `BACKEND_JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("BACKEND_JWT_SECRET")
            .expect("BACKEND_JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "BACKEND_JWT_SECRET must not be empty");
        Self::new(secret)
    }

    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            audience: AUTHENTICATED_AUDIENCE.to_string(),
        }
    }
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the signature, expiration, and audience.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}
