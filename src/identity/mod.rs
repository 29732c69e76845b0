//! Identity, session and access control for the portal.
//! Keep the public surface thin and split implementation across sub-modules.

mod guard;
mod principal;
mod provider;
mod session;

pub use guard::{Decision, RouteGuard};
pub use principal::{Identity, ADMIN_ROLE, ADMIN_USERNAME};
pub use provider::{AuthProvider, Credential, FixedCredentials, INVALID_CREDENTIALS_MSG, MISSING_CREDENTIALS_MSG};
pub use session::{SessionSnapshot, SessionState, SessionStore, SESSION_KEY};
