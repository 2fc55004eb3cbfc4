//! Object store contract and its HTTP implementation.

use async_trait::async_trait;
use tracing::debug;

use crate::error::UploadError;
use crate::http::{service_message, HttpBackend};

/// The hosted binary object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload raw bytes under `path` in `bucket`; returns the stored
    /// object path.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, UploadError>;

    /// Compose the durable public URL of a stored object.  Pure URL
    /// construction, no request.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Remove the listed objects from `bucket`.
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), UploadError>;
}

#[async_trait]
impl ObjectStore for HttpBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let size = bytes.len();
        let response = self
            .authed(
                self.http
                    .post(self.config.storage_url(&format!("{bucket}/{path}")))
                    .header("Content-Type", content_type)
                    .body(bytes),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::Service(service_message(response).await));
        }

        debug!(bucket, path, size, "Uploaded object");
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.config.storage_url(&format!("public/{bucket}/{path}"))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), UploadError> {
        if paths.is_empty() {
            return Ok(());
        }

        let response = self
            .authed(
                self.http
                    .delete(self.config.storage_url(bucket))
                    .json(&serde_json::json!({ "prefixes": paths })),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::Service(service_message(response).await));
        }

        debug!(bucket, count = paths.len(), "Removed objects");
        Ok(())
    }
}
