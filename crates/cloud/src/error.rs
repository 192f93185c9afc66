/// Errors from the hosted backend clients.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The service could not be reached at all.
    #[error("Unable to connect to {service} service. Please check your internet connection and try again.")]
    Unavailable {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status. `message` is the
    /// provider's own message where one was present.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx with a body we could not use.
    #[error("Invalid response from {service} service: {detail}")]
    InvalidResponse { service: &'static str, detail: String },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl CloudError {
    /// HTTP status reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CloudError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of a provider error body.
///
/// The identity and storage APIs disagree on the key: `msg`,
/// `error_description`, `message`, and `error` are all seen in the wild.
pub(crate) fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key)?.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
