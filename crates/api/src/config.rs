use std::time::Duration;

use postforge_core::approval::DEFAULT_REDIRECT_DELAY_MS;
use postforge_core::contract::ResponseContract;
use postforge_pipeline::generation::{GenerationConfig, DEFAULT_GENERATION_TIMEOUT};

use crate::auth::jwt::JwtConfig;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &str) -> String {
    let value = std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set in the environment"));
    assert!(!value.trim().is_empty(), "{key} must not be empty");
    value
}

fn parsed<T: std::str::FromStr>(key: &str, default: &str) -> T {
    env_or(key, default)
        .parse()
        .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>()))
}

/// Everything the server reads from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    /// Load all sections and check they agree with each other.
    ///
    /// # Panics
    ///
    /// Panics on a missing required variable, a malformed value, or a
    /// request timeout that would cut the generation race short.
    pub fn from_env() -> Self {
        let config = Self {
            server: ServerConfig::from_env(),
            backend: BackendConfig::from_env(),
            workflow: WorkflowConfig::from_env(),
        };
        assert!(
            config.server.request_timeout_secs > config.workflow.generation_timeout_secs,
            "REQUEST_TIMEOUT_SECS ({}) must exceed GENERATION_TIMEOUT_SECS ({})",
            config.server.request_timeout_secs,
            config.workflow.generation_timeout_secs,
        );
        config
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `150`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background work (default: `30`).
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `150`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parsed("PORT", "3000"),
            cors_origins,
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS", "150"),
            shutdown_timeout_secs: parsed("SHUTDOWN_TIMEOUT_SECS", "30"),
        }
    }
}

/// The hosted backend: row store, identity provider, object storage.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub database_url: String,
    /// Project base URL of the hosted backend.
    pub url: String,
    pub anon_key: String,
    pub jwt: JwtConfig,
    pub storage_bucket: String,
}

impl BackendConfig {
    /// | Env Var              | Required | Default          |
    /// |----------------------|----------|------------------|
    /// | `DATABASE_URL`       | **yes**  | --               |
    /// | `BACKEND_URL`        | **yes**  | --               |
    /// | `BACKEND_ANON_KEY`   | **yes**  | --               |
    /// | `BACKEND_JWT_SECRET` | **yes**  | --               |
    /// | `STORAGE_BUCKET`     | no       | `content-assets` |
    pub fn from_env() -> Self {
        Self {
            database_url: required("DATABASE_URL"),
            url: required("BACKEND_URL"),
            anon_key: required("BACKEND_ANON_KEY"),
            jwt: JwtConfig::from_env(),
            storage_bucket: env_or("STORAGE_BUCKET", "content-assets"),
        }
    }
}

/// Automation webhooks and workflow timing.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub generation_webhook_url: String,
    pub approval_webhook_url: String,
    pub generation_timeout_secs: u64,
    /// Upper bound on any single webhook call, including late ones.
    pub webhook_hard_timeout_secs: u64,
    pub approval_redirect_delay_ms: u64,
    pub response_contract: ResponseContract,
}

impl WorkflowConfig {
    /// | Env Var                      | Required | Default |
    /// |------------------------------|----------|---------|
    /// | `GENERATION_WEBHOOK_URL`     | **yes**  | --      |
    /// | `APPROVAL_WEBHOOK_URL`       | **yes**  | --      |
    /// | `GENERATION_TIMEOUT_SECS`    | no       | `120`   |
    /// | `WEBHOOK_HARD_TIMEOUT_SECS`  | no       | `600`   |
    /// | `APPROVAL_REDIRECT_DELAY_MS` | no       | `1500`  |
    /// | `RESPONSE_CONTRACT_PATH`     | no       | built-in `v1` contract |
    pub fn from_env() -> Self {
        let response_contract = match std::env::var("RESPONSE_CONTRACT_PATH") {
            Ok(path) if !path.trim().is_empty() => {
                let raw = std::fs::read_to_string(&path)
                    .unwrap_or_else(|e| panic!("Cannot read RESPONSE_CONTRACT_PATH '{path}': {e}"));
                ResponseContract::from_json(&raw)
                    .unwrap_or_else(|e| panic!("Invalid response contract in '{path}': {e}"))
            }
            _ => ResponseContract::v1(),
        };

        let config = Self {
            generation_webhook_url: required("GENERATION_WEBHOOK_URL"),
            approval_webhook_url: required("APPROVAL_WEBHOOK_URL"),
            generation_timeout_secs: parsed(
                "GENERATION_TIMEOUT_SECS",
                &DEFAULT_GENERATION_TIMEOUT.as_secs().to_string(),
            ),
            webhook_hard_timeout_secs: parsed("WEBHOOK_HARD_TIMEOUT_SECS", "600"),
            approval_redirect_delay_ms: parsed(
                "APPROVAL_REDIRECT_DELAY_MS",
                &DEFAULT_REDIRECT_DELAY_MS.to_string(),
            ),
            response_contract,
        };
        assert!(
            config.webhook_hard_timeout_secs >= config.generation_timeout_secs,
            "WEBHOOK_HARD_TIMEOUT_SECS must not be shorter than GENERATION_TIMEOUT_SECS",
        );
        config
    }

    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            timeout: Duration::from_secs(self.generation_timeout_secs),
            contract: self.response_contract.clone(),
        }
    }

    pub fn webhook_hard_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_hard_timeout_secs)
    }
}
