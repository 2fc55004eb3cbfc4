//! Media submission pipeline.
//!
//! Turns a client-side image selection into a stored object with a
//! durable public URL, before the enclosing record is created.  An
//! upload failure aborts the whole create — no post or comment row is
//! ever written pointing at media that does not exist.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use coterie_backend::{ObjectStore, UploadError};
use coterie_shared::constants::DEFAULT_AVATAR_URL;
use coterie_shared::models::MediaRef;

/// A client-side file selection handed to the pipeline.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Original file name; only its sanitized form ends up in the
    /// object name.
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct MediaSubmissionPipeline {
    objects: Arc<dyn ObjectStore>,
}

impl MediaSubmissionPipeline {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }

    /// Upload `media` into `bucket` under a collision-resistant name
    /// and return its managed reference.
    pub async fn submit(&self, bucket: &str, media: MediaUpload) -> Result<MediaRef, UploadError> {
        let path = object_name(Utc::now(), &media.original_name);
        let stored = self
            .objects
            .upload(bucket, &path, media.bytes, &media.content_type)
            .await?;
        let url = self.objects.public_url(bucket, &stored);

        info!(bucket, path = %stored, "Media submitted");

        Ok(MediaRef::Managed {
            bucket: bucket.to_string(),
            path: stored,
            url,
        })
    }

    /// Replace a profile image: delete the prior object first, but only
    /// when it is recognizably one of ours (managed, in this bucket,
    /// not the default avatar).  Externally supplied URLs are left
    /// alone.  A failed delete is logged and does not block the
    /// replacement.
    pub async fn replace_profile_image(
        &self,
        bucket: &str,
        prior_url: Option<&str>,
        media: MediaUpload,
    ) -> Result<MediaRef, UploadError> {
        if let Some(url) = prior_url {
            if url != DEFAULT_AVATAR_URL {
                if let MediaRef::Managed { path, .. } = MediaRef::classify(url, bucket) {
                    if let Err(e) = self.objects.remove(bucket, &[path.clone()]).await {
                        warn!(bucket, path = %path, error = %e, "Failed to delete prior profile image");
                    }
                }
            }
        }

        self.submit(bucket, media).await
    }
}

/// Object name: epoch millis plus a sanitized original-name suffix.
fn object_name(now: DateTime<Utc>, original_name: &str) -> String {
    let suffix: String = original_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let suffix = if suffix.is_empty() {
        "upload".to_string()
    } else {
        suffix
    };
    format!("{}_{}", now.timestamp_millis(), suffix)
}
