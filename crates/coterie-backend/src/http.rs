//! The production backend handle.
//!
//! One [`HttpBackend`] serves all four service contracts.  It carries
//! the shared `reqwest` client, the backend configuration, and the
//! session access token issued by the identity provider.

use std::sync::RwLock;

use reqwest::RequestBuilder;

use crate::config::BackendConfig;

pub struct HttpBackend {
    pub(crate) http: reqwest::Client,
    pub(crate) config: BackendConfig,
    /// Bearer token of the signed-in session, if any.  Written by the
    /// identity calls, read by every authenticated request.
    pub(crate) access_token: RwLock<Option<String>>,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            access_token: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub(crate) fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = token;
        }
    }

    pub(crate) fn access_token(&self) -> Option<String> {
        self.access_token.read().ok().and_then(|g| g.clone())
    }

    /// Attach the API key and, when present, the session bearer token.
    pub(crate) fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header("apikey", &self.config.api_key);
        match self.access_token() {
            Some(token) => req.bearer_auth(token),
            None => req.bearer_auth(&self.config.api_key),
        }
    }
}

/// Read a non-success response's body into a service error message.
pub(crate) async fn service_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    // The backend wraps its messages in a JSON envelope; fall back to
    // the raw body when it does not.
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(String::from))
        })
        .unwrap_or(body);

    if detail.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {detail}")
    }
}
