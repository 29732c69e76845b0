use crate::error::{AppError, AppResult};

use super::principal::Identity;

pub const MISSING_CREDENTIALS_MSG: &str = "Please enter both username and password";
pub const INVALID_CREDENTIALS_MSG: &str = "Invalid credentials. Please use admin/admin";

/// One login attempt. Never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

// Keep the password out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential").field("username", &self.username).field("password", &"<redacted>").finish()
    }
}

impl Credential {
    /// Submit-time validation: both fields must be non-blank. The username is trimmed,
    /// the password is kept verbatim.
    pub fn parse(username: &str, password: &str) -> AppResult<Self> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(AppError::user("missing_credentials", MISSING_CREDENTIALS_MSG));
        }
        Ok(Self { username: username.to_string(), password: password.to_string() })
    }
}

/// Credential check behind the session store. Returns the identity to sign in as,
/// or `None` on mismatch.
pub trait AuthProvider: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> Option<Identity>;
}

/// Placeholder check: accepts exactly `admin`/`admin` and signs in as the administrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCredentials;

impl AuthProvider for FixedCredentials {
    fn verify(&self, username: &str, password: &str) -> Option<Identity> {
        if username == "admin" && password == "admin" {
            Some(Identity::administrator())
        } else {
            None
        }
    }
}
