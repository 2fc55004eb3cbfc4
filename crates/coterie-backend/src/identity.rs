//! Identity provider contract and its HTTP implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coterie_shared::types::UserId;

use crate::error::AuthError;
use crate::http::{service_message, HttpBackend};

/// An authenticated principal as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// Profile fields attached to a sign-up request.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpProfile {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// The hosted identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The current session's principal, or `None` when signed out.
    async fn current_user(&self) -> Result<Option<AuthUser>, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Register a new principal.  Fails with
    /// [`AuthError::AlreadyRegistered`] when the email is taken, so the
    /// caller can fall back to sign-in.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &SignUpProfile,
    ) -> Result<AuthUser, AuthError>;
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireUser {
    id: UserId,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: WireUser,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<WireUser>,
    // With confirmations disabled the provider returns the user object
    // at the top level instead of a session envelope.
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a SignUpProfile,
}

#[async_trait]
impl IdentityProvider for HttpBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>, AuthError> {
        if self.access_token().is_none() {
            return Ok(None);
        }

        let response = self
            .authed(self.http.get(self.config.auth_url("user")))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!("Stored access token no longer valid");
            self.set_access_token(None);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AuthError::Service(service_message(response).await));
        }

        let user: WireUser = response
            .json()
            .await
            .map_err(|e| AuthError::Service(format!("Malformed user payload: {e}")))?;

        Ok(Some(AuthUser {
            id: user.id,
            email: user.email,
        }))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .authed(
                self.http
                    .post(format!("{}?grant_type=password", self.config.auth_url("token")))
                    .json(&PasswordGrant { email, password }),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidCredentials(service_message(response).await));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Service(format!("Malformed token payload: {e}")))?;

        self.set_access_token(Some(token.access_token));
        info!(user_id = %token.user.id, "Signed in");

        Ok(AuthUser {
            id: token.user.id,
            email: token.user.email,
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &SignUpProfile,
    ) -> Result<AuthUser, AuthError> {
        let response = self
            .authed(
                self.http
                    .post(self.config.auth_url("signup"))
                    .json(&SignUpRequest {
                        email,
                        password,
                        data: profile,
                    }),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            let message = service_message(response).await;
            if message.to_lowercase().contains("already registered") {
                return Err(AuthError::AlreadyRegistered);
            }
            return Err(AuthError::Service(message));
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Service(format!("Malformed signup payload: {e}")))?;

        let user = match (body.user, body.id) {
            (Some(u), _) => u,
            (None, Some(id)) => WireUser {
                id,
                email: body.email.unwrap_or_default(),
            },
            _ => {
                return Err(AuthError::Service(
                    "Signup response carried no user".to_string(),
                ))
            }
        };

        if let Some(token) = body.access_token {
            self.set_access_token(Some(token));
        }
        info!(user_id = %user.id, "Signed up");

        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }
}
