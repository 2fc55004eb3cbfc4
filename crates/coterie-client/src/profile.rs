//! Profile editing: username and profile-image changes.

use std::sync::Arc;

use tracing::info;

use coterie_backend::RecordStore;
use coterie_shared::models::Author;

use crate::error::SessionError;
use crate::media::{MediaSubmissionPipeline, MediaUpload};
use crate::session::SessionContext;

pub struct ProfileEditor {
    records: Arc<dyn RecordStore>,
    media: MediaSubmissionPipeline,
    profile_bucket: String,
}

impl ProfileEditor {
    pub fn new(
        records: Arc<dyn RecordStore>,
        media: MediaSubmissionPipeline,
        profile_bucket: impl Into<String>,
    ) -> Self {
        Self {
            records,
            media,
            profile_bucket: profile_bucket.into(),
        }
    }

    /// Apply a profile change: an optional new image (replacing the
    /// prior managed object) and an optional new username.  Issues a
    /// single update and returns the refreshed session — the session
    /// is the feed's fallback identity and must track the change.
    pub async fn update_profile(
        &self,
        session: &SessionContext,
        new_username: Option<&str>,
        new_image: Option<MediaUpload>,
    ) -> Result<SessionContext, SessionError> {
        let mut avatar_url = session.author.avatar_url.clone();
        let mut display_name = session.author.display_name.clone();

        if let Some(upload) = new_image {
            let media = self
                .media
                .replace_profile_image(&self.profile_bucket, Some(&avatar_url), upload)
                .await?;
            avatar_url = media.url().to_string();
        }

        if let Some(name) = new_username {
            let name = name.trim();
            if !name.is_empty() {
                display_name = name.to_string();
            }
        }

        self.records
            .update_user_profile(session.user_id, &display_name, &avatar_url)
            .await?;

        info!(user_id = %session.user_id, "Profile updated");

        Ok(SessionContext::new(Author {
            id: session.user_id,
            display_name,
            avatar_url,
        }))
    }
}
