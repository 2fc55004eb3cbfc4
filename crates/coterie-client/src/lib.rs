//! # coterie-client
//!
//! The client core of the Coterie social feed: session resolution,
//! media submission, and the feed synchronization engine that keeps an
//! in-memory render cache merged with the hosted record store and its
//! realtime change feed.  The rendering adapter in [`render`] produces
//! plain display rows; no UI code lives here.

pub mod error;
pub mod feed;
pub mod media;
pub mod profile;
pub mod render;
pub mod resolver;
pub mod session;

#[cfg(test)]
mod testutil;

pub use error::{FeedError, SessionError, ValidationError};
pub use feed::FeedSyncEngine;
pub use media::{MediaSubmissionPipeline, MediaUpload};
pub use profile::ProfileEditor;
pub use render::RenderedPost;
pub use resolver::{IdentityResolver, SignUpForm};
pub use session::SessionContext;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.  `RUST_LOG` overrides the
/// default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("coterie_client=debug,coterie_backend=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
