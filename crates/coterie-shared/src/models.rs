//! Feed domain models.
//!
//! These are the client's rendered view of the hosted store's rows.
//! The authoritative copy of every post and comment lives remotely;
//! everything here is a transient, rebuildable render cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_AVATAR_URL, DEFAULT_DISPLAY_NAME};
use crate::types::{CommentId, PostId, UserId};

// ---------------------------------------------------------------------------
// Author
// ---------------------------------------------------------------------------

/// The identity a content item is displayed under.
///
/// Built either from a joined `Users` row or, when a store response
/// omits the join, from the session's own resolved identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    /// Identity-provider principal id, stable across sessions.
    pub id: UserId,
    /// Display name; never empty (sentinel-defaulted on construction).
    pub display_name: String,
    /// Avatar URL; never empty (sentinel-defaulted on construction).
    pub avatar_url: String,
}

impl Author {
    /// Build an author from possibly-empty stored profile fields,
    /// substituting the fixed sentinels where needed.
    pub fn from_profile(
        id: UserId,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Self {
            id,
            display_name: display_name
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            avatar_url: avatar_url
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AVATAR_URL.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderTime
// ---------------------------------------------------------------------------

/// Two-phase timestamp of a rendered item.
///
/// A just-created item is displayed immediately with the client's wall
/// clock (`Pending`); the next full sync replaces the whole render
/// state with store rows carrying the server-authoritative time
/// (`Confirmed`).  The pending value is never silently overwritten in
/// place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RenderTime {
    /// Client wall-clock time recorded at optimistic render.
    Pending(DateTime<Utc>),
    /// Server-assigned creation time from a store row.
    Confirmed(DateTime<Utc>),
}

impl RenderTime {
    /// The absolute instant used for display and label formatting.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            Self::Pending(t) | Self::Confirmed(t) => *t,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

// ---------------------------------------------------------------------------
// MediaRef
// ---------------------------------------------------------------------------

/// Provenance-tagged media reference.
///
/// `Managed` objects were uploaded by this client and may be deleted
/// when replaced; `External` URLs were supplied from elsewhere and are
/// never touched in the object store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaRef {
    Managed {
        bucket: String,
        path: String,
        url: String,
    },
    External {
        url: String,
    },
}

impl MediaRef {
    /// The URL embedded verbatim into store rows.
    pub fn url(&self) -> &str {
        match self {
            Self::Managed { url, .. } => url,
            Self::External { url } => url,
        }
    }

    pub fn is_managed(&self) -> bool {
        matches!(self, Self::Managed { .. })
    }

    /// Reconstruct the tag for a URL read back from the record store.
    ///
    /// A URL counts as managed only when it contains the fixed
    /// `/<bucket>/` path segment of the given bucket; the trailing
    /// query string (if any) is not part of the object path.
    pub fn classify(url: &str, bucket: &str) -> Self {
        let marker = format!("/{bucket}/");
        match url.split_once(&marker) {
            Some((_, rest)) if !rest.is_empty() => {
                let path = rest.split('?').next().unwrap_or(rest).to_string();
                if path.is_empty() {
                    Self::External {
                        url: url.to_string(),
                    }
                } else {
                    Self::Managed {
                        bucket: bucket.to_string(),
                        path,
                        url: url.to_string(),
                    }
                }
            }
            _ => Self::External {
                url: url.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A rendered feed post.  Content is immutable once created; posts are
/// replaced wholesale on full sync and never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    /// 0–750 characters; may be empty when media is attached.
    pub content: String,
    /// Public URL of the attached media, if any.
    pub media_url: Option<String>,
    pub created_at: RenderTime,
    pub author: Author,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A rendered comment under a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub body: String,
    pub created_at: RenderTime,
    pub author: Author,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn uid() -> UserId {
        UserId(Uuid::new_v4())
    }

    #[test]
    fn test_author_sentinels() {
        let a = Author::from_profile(uid(), None, Some("   ".into()));
        assert_eq!(a.display_name, DEFAULT_DISPLAY_NAME);
        assert_eq!(a.avatar_url, DEFAULT_AVATAR_URL);
    }

    #[test]
    fn test_author_keeps_stored_fields() {
        let a = Author::from_profile(uid(), Some("ada".into()), Some("http://x/a.png".into()));
        assert_eq!(a.display_name, "ada");
        assert_eq!(a.avatar_url, "http://x/a.png");
    }

    #[test]
    fn test_classify_managed() {
        let url = "https://cdn.example.com/storage/v1/object/public/profile-images/1700_me.png?v=2";
        match MediaRef::classify(url, "profile-images") {
            MediaRef::Managed { bucket, path, .. } => {
                assert_eq!(bucket, "profile-images");
                assert_eq!(path, "1700_me.png");
            }
            other => panic!("expected managed, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_external() {
        let m = MediaRef::classify("https://elsewhere.net/pic.jpg", "profile-images");
        assert!(!m.is_managed());
    }

    #[test]
    fn test_classify_bare_bucket_segment_is_external() {
        let m = MediaRef::classify("https://cdn/x/profile-images/", "profile-images");
        assert!(!m.is_managed());
    }

    #[test]
    fn test_render_time_instant() {
        let now = Utc::now();
        assert_eq!(RenderTime::Pending(now).instant(), now);
        assert!(RenderTime::Pending(now).is_pending());
        assert!(!RenderTime::Confirmed(now).is_pending());
    }
}
