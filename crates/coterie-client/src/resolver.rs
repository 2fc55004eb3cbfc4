//! Session resolution and onboarding.
//!
//! `resolve_session` establishes the one identity every other
//! operation falls back to; `sign_in` and `sign_up` wrap the identity
//! provider's flows, including the already-registered fallback and the
//! reconciliation of the `Users` relation against the authenticated
//! principal.

use std::sync::Arc;

use tracing::{info, warn};

use coterie_backend::rows::NewUser;
use coterie_backend::{AuthError, IdentityProvider, RecordStore, SignUpProfile};
use coterie_shared::constants::DEFAULT_AVATAR_URL;

use crate::error::{SessionError, ValidationError};
use crate::session::SessionContext;

/// Sign-up form input, validated before any remote call.
#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct IdentityResolver {
    identity: Arc<dyn IdentityProvider>,
    records: Arc<dyn RecordStore>,
}

impl IdentityResolver {
    pub fn new(identity: Arc<dyn IdentityProvider>, records: Arc<dyn RecordStore>) -> Self {
        Self { identity, records }
    }

    /// Resolve the active session's identity: the authenticated
    /// principal joined with its profile record, sentinel-defaulted.
    ///
    /// `NotAuthenticated` means no principal (route to sign-in);
    /// `ProfileMissing` means a principal without a `Users` row — a
    /// provisioning inconsistency, surfaced distinctly so the caller
    /// can show a blocking notice instead of a plain login prompt.
    pub async fn resolve_session(&self) -> Result<SessionContext, SessionError> {
        let user = self
            .identity
            .current_user()
            .await?
            .ok_or(SessionError::NotAuthenticated)?;

        let record = self
            .records
            .fetch_user(user.id)
            .await?
            .ok_or(SessionError::ProfileMissing)?;

        let session = SessionContext::new(record.into_author());
        info!(user_id = %session.user_id, "Session resolved");
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionContext, SessionError> {
        if email.trim().is_empty() {
            return Err(ValidationError::MissingField("email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }

        self.identity.sign_in(email.trim(), password).await?;
        self.resolve_session().await
    }

    /// Register a new account, falling back to sign-in when the email
    /// is already registered, then reconcile the `Users` relation so
    /// exactly one row exists for this email under the authenticated
    /// principal's id.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SessionContext, SessionError> {
        validate_sign_up(form)?;
        let email = form.email.trim();

        let profile = SignUpProfile {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            username: form.username.trim().to_string(),
        };

        let auth_user = match self.identity.sign_up(email, &form.password, &profile).await {
            Ok(user) => user,
            Err(AuthError::AlreadyRegistered) => {
                info!(email, "Email already registered, signing in instead");
                self.identity.sign_in(email, &form.password).await?
            }
            Err(e) => return Err(e.into()),
        };

        // Reconcile the Users relation: a row for this email under a
        // stale id is replaced; a missing row is provisioned.
        let existing = self.records.fetch_user_by_email(email).await?;
        let needs_insert = match existing {
            Some(row) if row.id == auth_user.id => false,
            Some(row) => {
                warn!(stale_id = %row.id, user_id = %auth_user.id, "Replacing stale user record");
                self.records.delete_user_by_email(email).await?;
                true
            }
            None => true,
        };

        if needs_insert {
            self.records
                .insert_user(&NewUser {
                    id: auth_user.id,
                    first_name: profile.first_name.clone(),
                    last_name: profile.last_name.clone(),
                    username: profile.username.clone(),
                    email: email.to_string(),
                    profile_image: DEFAULT_AVATAR_URL.to_string(),
                })
                .await?;
        }

        self.resolve_session().await
    }
}

fn validate_sign_up(form: &SignUpForm) -> Result<(), ValidationError> {
    let required: [(&'static str, &str); 5] = [
        ("first name", &form.first_name),
        ("last name", &form.last_name),
        ("username", &form.username),
        ("email", &form.email),
        ("password", &form.password),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(name));
        }
    }
    if form.password != form.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
