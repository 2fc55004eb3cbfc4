//! Resolved session identity, passed explicitly into every operation
//! that needs a fallback author.  There is deliberately no module
//! global: a `SessionContext` only exists after a successful
//! [`resolve_session`](crate::resolver::IdentityResolver::resolve_session).

use coterie_shared::models::Author;
use coterie_shared::types::UserId;

/// The active session's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Identity-provider principal id.
    pub user_id: UserId,

    /// The session user's own profile, used as the fallback author
    /// wherever a store response omits its author join.
    pub author: Author,
}

impl SessionContext {
    pub fn new(author: Author) -> Self {
        Self {
            user_id: author.id,
            author,
        }
    }
}
