//! # coterie-shared
//!
//! Domain types shared between the backend service clients and the
//! client core: typed identifiers, feed models, fixed constants and
//! relative-time formatting.  This crate knows nothing about HTTP or
//! the hosted backend; it only describes the data the rest of the
//! workspace moves around.

pub mod constants;
pub mod models;
pub mod timefmt;
pub mod types;

pub use models::{Author, Comment, MediaRef, Post, RenderTime};
pub use types::{CommentId, PostId, UserId};
