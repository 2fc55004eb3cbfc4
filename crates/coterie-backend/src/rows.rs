//! Wire rows of the record store's three relations.
//!
//! Field names match the store's column names verbatim; the embedded
//! author join arrives under the relation name `Users` and is optional
//! (insert responses and push events usually omit it).  Conversions
//! into the shared render models apply the fallback-identity policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coterie_shared::models::{Author, Comment, Post, RenderTime};
use coterie_shared::types::{CommentId, PostId, UserId};

/// A full `Users` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub email: String,
    pub profile_image: Option<String>,
}

impl UserRow {
    pub fn into_author(self) -> Author {
        Author::from_profile(self.id, self.username, self.profile_image)
    }
}

/// The embedded `Users(username, profile_image)` join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorJoin {
    pub username: Option<String>,
    pub profile_image: Option<String>,
}

/// A `Posts` row, optionally joined with its author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostRow {
    pub id: PostId,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "Users", default)]
    pub author: Option<AuthorJoin>,
}

impl PostRow {
    /// Build the render model for a store-confirmed row.  When the
    /// author join is absent the session's own identity stands in.
    pub fn into_post(self, fallback: &Author) -> Post {
        let author = resolve_author(self.user_id, self.author, fallback);
        Post {
            id: self.id,
            content: self.content.unwrap_or_default(),
            media_url: self.image_url,
            created_at: RenderTime::Confirmed(self.created_at),
            author,
        }
    }
}

/// A `Comments` row, optionally joined with its author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentRow {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "Users", default)]
    pub author: Option<AuthorJoin>,
}

impl CommentRow {
    pub fn into_comment(self, fallback: &Author) -> Comment {
        let author = resolve_author(self.user_id, self.author, fallback);
        Comment {
            id: self.id,
            post_id: self.post_id,
            body: self.comment_text,
            created_at: RenderTime::Confirmed(self.created_at),
            author,
        }
    }
}

fn resolve_author(user_id: UserId, join: Option<AuthorJoin>, fallback: &Author) -> Author {
    match join {
        Some(j) => Author::from_profile(user_id, j.username, j.profile_image),
        None => fallback.clone(),
    }
}

/// Insert payload for the `Users` relation.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub profile_image: String,
}

/// Insert payload for the `Posts` relation.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub content: String,
    pub image_url: Option<String>,
    pub user_id: UserId,
}

/// Insert payload for the `Comments` relation.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub user_id: UserId,
    pub comment_text: String,
}
