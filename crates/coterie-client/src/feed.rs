//! Feed synchronization engine.
//!
//! Owns the in-memory render cache of posts and comments: full
//! fetch-and-replace against the record store, optimistic front-insert
//! on create, merge of push-delivered comment inserts, and the
//! periodic relative-time label refresh.
//!
//! Ordering policy: newest first by `created_at`, row order taken from
//! the store verbatim on full sync.  An optimistically rendered item
//! sits at the front until the next full sync reconciles true order —
//! an accepted temporary inconsistency.  The state mutex is only held
//! for short synchronous segments, never across an await.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use coterie_backend::{CommentInsertEvent, RecordStore};
use coterie_backend::rows::{NewComment, NewPost};
use coterie_shared::constants::{LABEL_REFRESH_SECS, MAX_POST_CONTENT_LEN};
use coterie_shared::models::{Author, Comment, Post, RenderTime};
use coterie_shared::timefmt::relative_label;
use coterie_shared::types::PostId;

use crate::error::{FeedError, ValidationError};
use crate::media::{MediaSubmissionPipeline, MediaUpload};
use crate::render::{self, RenderedPost};
use crate::session::SessionContext;

/// A rendered post with its comment thread and cached display labels.
pub(crate) struct FeedPost {
    pub(crate) post: Post,
    pub(crate) time_label: String,
    pub(crate) comments: Vec<FeedComment>,
    pub(crate) comments_visible: bool,
}

pub(crate) struct FeedComment {
    pub(crate) comment: Comment,
    pub(crate) time_label: String,
}

#[derive(Default)]
struct FeedState {
    /// Newest first.
    posts: Vec<FeedPost>,
}

pub struct FeedSyncEngine {
    records: Arc<dyn RecordStore>,
    media: MediaSubmissionPipeline,
    post_bucket: String,
    state: Mutex<FeedState>,
    /// Duplicate-submission guard for the post composer.  Scoped to
    /// that single input source, not global.
    post_in_flight: AtomicBool,
}

/// Releases the in-flight flag on every exit path.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FeedSyncEngine {
    pub fn new(
        records: Arc<dyn RecordStore>,
        media: MediaSubmissionPipeline,
        post_bucket: impl Into<String>,
    ) -> Self {
        Self {
            records,
            media,
            post_bucket: post_bucket.into(),
            state: Mutex::new(FeedState::default()),
            post_in_flight: AtomicBool::new(false),
        }
    }

    /// Fetch all posts (joined with authors, newest first), then each
    /// post's comments, and replace the entire rendered state.  An
    /// empty store renders the empty state, not an error.
    pub async fn full_sync(&self, session: &SessionContext) -> Result<(), FeedError> {
        let rows = self.records.fetch_posts().await?;

        let mut posts = Vec::with_capacity(rows.len());
        let now = Utc::now();
        for row in rows {
            let comment_rows = self.records.fetch_comments(row.id).await?;
            let post = row.into_post(&session.author);
            let comments = comment_rows
                .into_iter()
                .map(|c| {
                    let comment = c.into_comment(&session.author);
                    let time_label = relative_label(now, comment.created_at.instant());
                    FeedComment {
                        comment,
                        time_label,
                    }
                })
                .collect();
            posts.push(FeedPost {
                time_label: relative_label(now, post.created_at.instant()),
                post,
                comments,
                comments_visible: false,
            });
        }

        let count = posts.len();
        {
            let mut state = self.lock_state();
            state.posts = posts;
        }

        info!(posts = count, "Full sync complete");
        Ok(())
    }

    /// Create a post and optimistically render it at the front of the
    /// feed.  Upload (if any) strictly precedes the store insert, which
    /// strictly precedes the render; any failure leaves the rendered
    /// state untouched.
    pub async fn create_post(
        &self,
        session: &SessionContext,
        content: &str,
        media: Option<MediaUpload>,
    ) -> Result<Post, FeedError> {
        let _guard =
            InFlight::acquire(&self.post_in_flight).ok_or(FeedError::SubmissionInFlight)?;

        if content.trim().is_empty() && media.is_none() {
            return Err(ValidationError::EmptyPost.into());
        }
        let len = content.chars().count();
        if len > MAX_POST_CONTENT_LEN {
            return Err(ValidationError::ContentTooLong { len }.into());
        }

        let media_url = match media {
            Some(upload) => Some(
                self.media
                    .submit(&self.post_bucket, upload)
                    .await?
                    .url()
                    .to_string(),
            ),
            None => None,
        };

        let row = self
            .records
            .insert_post(&NewPost {
                content: content.to_string(),
                image_url: media_url.clone(),
                user_id: session.user_id,
            })
            .await?;

        // Immediate display uses the client clock and the session
        // identity; the store's own timestamp and join are picked up by
        // the next full sync.
        let now = Utc::now();
        let post = Post {
            id: row.id,
            content: content.to_string(),
            media_url,
            created_at: RenderTime::Pending(now),
            author: session.author.clone(),
        };

        {
            let mut state = self.lock_state();
            state.posts.insert(
                0,
                FeedPost {
                    time_label: relative_label(now, now),
                    post: post.clone(),
                    comments: Vec::new(),
                    comments_visible: false,
                },
            );
        }

        info!(post_id = %post.id, has_media = post.media_url.is_some(), "Post created");
        Ok(post)
    }

    /// Create a comment and optimistically render it at the front of
    /// the target post's thread, revealing the thread as a side
    /// effect.
    pub async fn create_comment(
        &self,
        session: &SessionContext,
        post_id: PostId,
        body: &str,
    ) -> Result<Comment, FeedError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ValidationError::EmptyComment.into());
        }

        let row = self
            .records
            .insert_comment(&NewComment {
                post_id,
                user_id: session.user_id,
                comment_text: body.to_string(),
            })
            .await?;

        let now = Utc::now();
        let comment = Comment {
            id: row.id,
            post_id,
            body: body.to_string(),
            created_at: RenderTime::Pending(now),
            author: session.author.clone(),
        };

        {
            let mut state = self.lock_state();
            if let Some(entry) = state.posts.iter_mut().find(|p| p.post.id == post_id) {
                entry.comments.insert(
                    0,
                    FeedComment {
                        comment: comment.clone(),
                        time_label: relative_label(now, now),
                    },
                );
                entry.comments_visible = true;
            }
        }

        info!(comment_id = %comment.id, post_id = %post_id, "Comment created");
        Ok(comment)
    }

    /// Merge a push-delivered comment INSERT into the rendered state.
    ///
    /// A miss — the target post is not rendered, or the comment id
    /// already is (the echo of our own optimistic insert) — is dropped
    /// silently; the next full sync restores consistency.
    pub fn apply_remote_comment(&self, session: &SessionContext, event: CommentInsertEvent) {
        let author = match event.author {
            Some(join) => Author::from_profile(event.user_id, join.username, join.profile_image),
            None => session.author.clone(),
        };

        let now = Utc::now();
        let mut state = self.lock_state();

        let Some(entry) = state.posts.iter_mut().find(|p| p.post.id == event.post_id) else {
            debug!(post_id = %event.post_id, "Push event for unrendered post, dropping");
            return;
        };
        if entry.comments.iter().any(|c| c.comment.id == event.id) {
            debug!(comment_id = %event.id, "Push event already rendered, dropping");
            return;
        }

        let comment = Comment {
            id: event.id,
            post_id: event.post_id,
            body: event.comment_text,
            created_at: RenderTime::Confirmed(event.created_at),
            author,
        };
        entry.comments.insert(
            0,
            FeedComment {
                time_label: relative_label(now, comment.created_at.instant()),
                comment,
            },
        );
    }

    /// Recompute every cached relative-time label from its stored
    /// absolute timestamp.  No fetch, no reordering; idempotent for a
    /// fixed `now`.
    pub fn refresh_time_labels(&self, now: DateTime<Utc>) {
        let mut state = self.lock_state();
        for entry in &mut state.posts {
            entry.time_label = relative_label(now, entry.post.created_at.instant());
            for c in &mut entry.comments {
                c.time_label = relative_label(now, c.comment.created_at.instant());
            }
        }
    }

    /// Show or hide a post's comment thread; returns the new
    /// visibility, or `None` when the post is not rendered.
    pub fn toggle_comments(&self, post_id: PostId) -> Option<bool> {
        let mut state = self.lock_state();
        let entry = state.posts.iter_mut().find(|p| p.post.id == post_id)?;
        entry.comments_visible = !entry.comments_visible;
        Some(entry.comments_visible)
    }

    /// Snapshot the rendered state as display rows.
    pub fn render(&self) -> Vec<RenderedPost> {
        let state = self.lock_state();
        render::render_posts(&state.posts)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, FeedState> {
        // Never held across an await; a poisoned guard still holds a
        // coherent snapshot, so recover it rather than unwind further.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Drive [`FeedSyncEngine::refresh_time_labels`] on the fixed refresh
/// interval until the engine is dropped by all other holders.
pub fn spawn_label_refresher(engine: Arc<FeedSyncEngine>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(LABEL_REFRESH_SECS));
        interval.tick().await;
        loop {
            interval.tick().await;
            engine.refresh_time_labels(Utc::now());
        }
    })
}

/// Consume a push subscription, merging each event into the engine.
/// Ends when the subscription does.
pub fn spawn_push_consumer(
    engine: Arc<FeedSyncEngine>,
    session: SessionContext,
    mut rx: tokio::sync::mpsc::Receiver<CommentInsertEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            engine.apply_remote_comment(&session, event);
        }
        debug!("Push consumer loop ended");
    })
}
