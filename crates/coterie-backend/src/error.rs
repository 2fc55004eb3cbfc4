use thiserror::Error;

/// Errors from the identity provider.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No authenticated principal for this session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The email is already registered with the provider.
    #[error("Email already registered")]
    AlreadyRegistered,

    /// Sign-in rejected by the provider.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Any other provider-side rejection, with the provider's message.
    #[error("Identity provider error: {0}")]
    Service(String),

    /// Network / transport failure before a provider response.
    #[error("Identity transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Errors from the record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected the request; carries the service's message.
    #[error("Record store error: {0}")]
    Service(String),

    /// Network / transport failure before a store response.
    #[error("Record store transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected row shape.
    #[error("Record store decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,
}

/// Errors from the object store.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The object store rejected the operation.
    #[error("Object store error: {0}")]
    Service(String),

    /// Network / transport failure before a store response.
    #[error("Object store transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Errors establishing the push-channel subscription.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("Push channel connect error: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Push channel handshake error: {0}")]
    Handshake(String),
}
