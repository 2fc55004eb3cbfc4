//! Backend configuration loaded from environment variables.
//!
//! All settings have defaults pointing at a local development stack so
//! the client can start with zero configuration.

use coterie_shared::constants::{POST_MEDIA_BUCKET, PROFILE_IMAGE_BUCKET};

/// Hosted backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the hosted backend (no trailing slash).
    /// Env: `COTERIE_BACKEND_URL`
    /// Default: `http://localhost:54321`
    pub base_url: String,

    /// Public API key sent with every request.
    /// Env: `COTERIE_API_KEY`
    /// Default: empty (development only).
    pub api_key: String,

    /// Object-store bucket for post media.
    /// Env: `COTERIE_POST_BUCKET`
    /// Default: `post-images`
    pub post_bucket: String,

    /// Object-store bucket for profile images.
    /// Env: `COTERIE_PROFILE_BUCKET`
    /// Default: `profile-images`
    pub profile_bucket: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            post_bucket: POST_MEDIA_BUCKET.to_string(),
            profile_bucket: PROFILE_IMAGE_BUCKET.to_string(),
        }
    }
}

impl BackendConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("COTERIE_BACKEND_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(key) = std::env::var("COTERIE_API_KEY") {
            config.api_key = key;
        }

        if let Ok(bucket) = std::env::var("COTERIE_POST_BUCKET") {
            if !bucket.is_empty() {
                config.post_bucket = bucket;
            }
        }

        if let Ok(bucket) = std::env::var("COTERIE_PROFILE_BUCKET") {
            if !bucket.is_empty() {
                config.profile_bucket = bucket;
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }

    /// REST endpoint for a relation in the record store.
    pub fn rest_url(&self, relation: &str) -> String {
        format!("{}/rest/v1/{relation}", self.base_url)
    }

    /// Identity-provider endpoint.
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// Object-store endpoint.
    pub fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{path}", self.base_url)
    }

    /// Websocket endpoint of the push channel.
    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0", self.api_key)
    }
}
