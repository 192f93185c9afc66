//! Object storage on the hosted backend.
//!
//! [`ObjectStore`] is the seam the upload workflow depends on;
//! [`BackendStorage`] implements it against the backend's `/storage/v1`
//! REST API. Objects are written with the uploading user's access token so
//! the bucket's ownership policies apply.

use async_trait::async_trait;
use reqwest::Url;

use crate::error::{provider_message, CloudError};

const SERVICE: &str = "storage";

/// Upload-by-path and public-URL lookup.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` at `path`. Fails if an object already exists there.
    async fn upload(
        &self,
        access_token: &str,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), CloudError>;

    /// Public URL of the object at `path`.
    fn public_url(&self, path: &str) -> Result<String, CloudError>;
}

/// Storage client for one bucket.
#[derive(Clone)]
pub struct BackendStorage {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
    bucket: String,
}

impl BackendStorage {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        anon_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Result<Self, CloudError> {
        let base_url = Url::parse(base_url).map_err(|e| CloudError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(CloudError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url,
            anon_key: anon_key.into(),
            bucket: bucket.into(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `{base}/storage/v1/object[/public]/{bucket}/{path...}` with every
    /// path segment percent-encoded.
    fn object_url(&self, public: bool, path: &str) -> Result<Url, CloudError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CloudError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(["storage", "v1", "object"]);
            if public {
                segments.push("public");
            }
            segments.push(&self.bucket);
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }
}

#[async_trait]
impl ObjectStore for BackendStorage {
    async fn upload(
        &self,
        access_token: &str,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), CloudError> {
        let url = self.object_url(false, path)?;
        let size = body.len();
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .header("x-upsert", "false")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .bearer_auth(access_token)
            .body(body)
            .send()
            .await
            .map_err(|source| CloudError::Unavailable {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = provider_message(&text).unwrap_or_else(|| "Upload failed".to_string());
            tracing::warn!(path, status = status.as_u16(), %message, "Object upload rejected");
            return Err(CloudError::Api {
                status: status.as_u16(),
                message,
            });
        }
        tracing::info!(path, size, bucket = %self.bucket, "Object uploaded");
        Ok(())
    }

    fn public_url(&self, path: &str) -> Result<String, CloudError> {
        Ok(self.object_url(true, path)?.to_string())
    }
}
