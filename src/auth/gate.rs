//! Access-control decision for protected routes

use super::session::{Session, SessionManager};

/// Outcome of an access check
#[derive(Debug, Clone)]
pub enum Access {
    Allow(Session),
    Deny,
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow(_))
    }
}

/// Allow iff the token resolves to a live session
///
/// Pure decision: the caller decides what a denial looks like.
pub async fn authorize(sessions: &SessionManager, token: Option<&str>) -> Access {
    let Some(token) = token else {
        return Access::Deny;
    };

    match sessions.resolve(token).await {
        Some(session) => Access::Allow(session),
        None => Access::Deny,
    }
}
