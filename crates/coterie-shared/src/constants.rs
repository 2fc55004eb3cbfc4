/// Maximum post content length in characters.
pub const MAX_POST_CONTENT_LEN: usize = 750;

/// Label shown for an author whose profile has no username.
pub const DEFAULT_DISPLAY_NAME: &str = "Unknown User";

/// Avatar used when a profile has no stored image.
pub const DEFAULT_AVATAR_URL: &str = "assets/images/default-avatar.jpg";

/// Object-store bucket holding post media.
pub const POST_MEDIA_BUCKET: &str = "post-images";

/// Object-store bucket holding profile images.
pub const PROFILE_IMAGE_BUCKET: &str = "profile-images";

/// How often rendered relative-time labels are recomputed, in seconds.
pub const LABEL_REFRESH_SECS: u64 = 60;

/// Realtime heartbeat interval in seconds.
pub const PUSH_HEARTBEAT_SECS: u64 = 30;
