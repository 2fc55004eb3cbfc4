use thiserror::Error;

use coterie_backend::{AuthError, StoreError, UploadError};
use coterie_shared::constants::MAX_POST_CONTENT_LEN;

/// Input problems caught before any remote call.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A post needs text or media.
    #[error("Post needs text or an image")]
    EmptyPost,

    /// Post content over the length cap.
    #[error("Post content too long: {len} characters (max {max})", max = MAX_POST_CONTENT_LEN)]
    ContentTooLong { len: usize },

    /// Comment body empty after trimming.
    #[error("Comment text is empty")]
    EmptyComment,

    /// A required form field was left blank.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Sign-up password confirmation mismatch.
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Failures of a feed operation.  Every variant leaves the rendered
/// state untouched.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Media upload failed; the enclosing create was aborted before
    /// any store write.
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A submission from the same input source is still in flight.
    #[error("A submission is already in flight")]
    SubmissionInFlight,
}

/// Failures establishing or refreshing a session.  These are fatal to
/// the session; caller policy is to route back to sign-in.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No authenticated principal.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Authenticated principal without a matching profile record — a
    /// provisioning inconsistency, not a login failure.
    #[error("No profile record for the authenticated user")]
    ProfileMissing,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}
