use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

use super::session::{SessionSnapshot, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    RedirectToLogin,
}

/// Access decision for the protected view. Fails closed: anything other than a
/// readable, authenticated state is a redirect. Holds no state, so nothing is cached
/// between navigations.
pub struct RouteGuard;

impl RouteGuard {
    pub fn authorize(state: Option<&SessionState>) -> Decision {
        match state {
            Some(s) if s.is_authenticated() => Decision::Allow,
            _ => Decision::RedirectToLogin,
        }
    }

    /// Decide from a wire snapshot; inconsistent snapshots are denied.
    pub fn authorize_snapshot(snapshot: &SessionSnapshot) -> Decision {
        Self::authorize(SessionState::from_snapshot(snapshot).as_ref())
    }

    /// Read the state through `read` and decide. An error or a panic inside `read`
    /// is logged and treated as unauthenticated.
    pub fn authorize_with<F>(read: F) -> Decision
    where
        F: FnOnce() -> anyhow::Result<SessionState>,
    {
        match catch_unwind(AssertUnwindSafe(read)) {
            Ok(Ok(state)) => Self::authorize(Some(&state)),
            Ok(Err(e)) => {
                warn!(target: "portal::guard", "session read failed: {:#}; redirecting to login", e);
                Decision::RedirectToLogin
            }
            Err(_) => {
                warn!(target: "portal::guard", "session read panicked; redirecting to login");
                Decision::RedirectToLogin
            }
        }
    }
}
