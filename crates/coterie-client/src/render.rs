//! Rendering adapter: pure conversion of the engine's merge state into
//! display rows.  The UI layer consumes these verbatim; nothing here
//! fetches or mutates.

use serde::Serialize;

use crate::feed::{FeedComment, FeedPost};

pub const TOGGLE_SHOW: &str = "Show Comments";
pub const TOGGLE_HIDE: &str = "Hide Comments";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderedComment {
    pub id: i64,
    pub author_name: String,
    pub author_avatar: String,
    pub body: String,
    pub time_label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPost {
    pub id: i64,
    pub content: String,
    pub media_url: Option<String>,
    pub author_name: String,
    pub author_avatar: String,
    pub time_label: String,
    /// True until the next full sync confirms the store timestamp.
    pub pending: bool,
    pub comments_visible: bool,
    /// Label for the comment-thread toggle in its current state.
    pub toggle_label: &'static str,
    pub comments: Vec<RenderedComment>,
}

pub(crate) fn render_posts(posts: &[FeedPost]) -> Vec<RenderedPost> {
    posts.iter().map(render_post).collect()
}

fn render_post(entry: &FeedPost) -> RenderedPost {
    RenderedPost {
        id: entry.post.id.0,
        content: entry.post.content.clone(),
        media_url: entry.post.media_url.clone(),
        author_name: entry.post.author.display_name.clone(),
        author_avatar: entry.post.author.avatar_url.clone(),
        time_label: entry.time_label.clone(),
        pending: entry.post.created_at.is_pending(),
        comments_visible: entry.comments_visible,
        toggle_label: if entry.comments_visible {
            TOGGLE_HIDE
        } else {
            TOGGLE_SHOW
        },
        comments: entry.comments.iter().map(render_comment).collect(),
    }
}

fn render_comment(entry: &FeedComment) -> RenderedComment {
    RenderedComment {
        id: entry.comment.id.0,
        author_name: entry.comment.author.display_name.clone(),
        author_avatar: entry.comment.author.avatar_url.clone(),
        body: entry.comment.body.clone(),
        time_label: entry.time_label.clone(),
    }
}
