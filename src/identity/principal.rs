use serde::{Deserialize, Serialize};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_ROLE: &str = "Administrator";

/// Authenticated principal. Serialized as `{"username": .., "role": ..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub role: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self { username: username.into(), role: role.into() }
    }

    pub fn administrator() -> Self { Self::new(ADMIN_USERNAME, ADMIN_ROLE) }

    /// A record restored from storage is only usable with a non-empty username.
    pub fn is_well_formed(&self) -> bool { !self.username.trim().is_empty() }
}
