//! # coterie-backend
//!
//! Contracts and HTTP clients for the hosted backend the feed client
//! runs against: the identity provider, the relational record store,
//! the object store, and the realtime push channel.  Each service is
//! consumed strictly through its public request/response surface; this
//! crate holds no state beyond the session's access token.
//!
//! The four contracts are traits so the client core can be exercised
//! against in-memory fakes; [`HttpBackend`] is the single production
//! handle implementing all of them.

pub mod config;
pub mod identity;
pub mod objects;
pub mod push;
pub mod records;
pub mod rows;

mod error;
mod http;

pub use config::BackendConfig;
pub use error::{AuthError, PushError, StoreError, UploadError};
pub use http::HttpBackend;
pub use identity::{AuthUser, IdentityProvider, SignUpProfile};
pub use objects::ObjectStore;
pub use push::{CommentInsertEvent, PushChannel};
pub use records::RecordStore;
