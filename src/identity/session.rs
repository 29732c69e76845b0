use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::{SharedKv, StorageError, StorageResult};

use super::principal::Identity;
use super::provider::{AuthProvider, FixedCredentials};

/// Storage key holding the serialized signed-in identity.
pub const SESSION_KEY: &str = "harness_user";

fn corrupt(message: impl Into<String>) -> StorageError {
    StorageError::Corrupt { key: SESSION_KEY.to_string(), message: message.into() }
}

/// Decode the persisted record. Only the object form `{"username": .., "role": ..}` is accepted.
fn decode_record(raw: &str) -> StorageResult<Identity> {
    match serde_json::from_str::<serde_json::Value>(raw).map_err(|e| corrupt(e.to_string()))? {
        serde_json::Value::Object(map) => {
            serde_json::from_value(serde_json::Value::Object(map)).map_err(|e| corrupt(e.to_string()))
        }
        _ => Err(corrupt("expected a JSON object")),
    }
}

fn encode_record(identity: &Identity) -> StorageResult<String> {
    serde_json::to_string(identity)
        .map_err(|e| StorageError::Encode { key: SESSION_KEY.to_string(), message: e.to_string() })
}

/// Who is signed in, if anyone. An identity exists iff the session is authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(Identity),
}

/// Wire form of `SessionState`: `{"identity": .., "isAuthenticated": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool { matches!(self, SessionState::Authenticated(_)) }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(id) => Some(id),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot { identity: self.identity().cloned(), is_authenticated: self.is_authenticated() }
    }

    /// Rebuild a state from a snapshot. Returns `None` when the flag and the identity disagree
    /// or the identity is not well formed.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        match (&snapshot.identity, snapshot.is_authenticated) {
            (None, false) => Some(SessionState::Unauthenticated),
            (Some(id), true) if id.is_well_formed() => Some(SessionState::Authenticated(id.clone())),
            _ => None,
        }
    }
}

/// Single source of truth for the signed-in identity, persisted through a `KeyValueStore`.
///
/// Constructed once at startup and shared by reference; all mutation goes through
/// `restore`, `login` and `logout`.
pub struct SessionStore {
    backend: SharedKv,
    provider: Box<dyn AuthProvider>,
    state: SessionState,
}

impl SessionStore {
    /// Store using the fixed `admin`/`admin` check. Starts unauthenticated; call `restore`.
    pub fn new(backend: SharedKv) -> Self {
        Self::with_provider(backend, FixedCredentials)
    }

    pub fn with_provider(backend: SharedKv, provider: impl AuthProvider + 'static) -> Self {
        Self { backend, provider: Box::new(provider), state: SessionState::Unauthenticated }
    }

    /// `new` followed by `restore`.
    pub fn open(backend: SharedKv) -> Self {
        let mut store = Self::new(backend);
        store.restore();
        store
    }

    pub fn state(&self) -> &SessionState { &self.state }

    /// Load the persisted identity. Missing, unreadable or malformed records all yield
    /// the unauthenticated state; a malformed record is deleted.
    pub fn restore(&mut self) -> SessionState {
        let record = self
            .backend
            .get(SESSION_KEY)
            .and_then(|raw| raw.as_deref().map(decode_record).transpose());
        self.state = match record {
            Ok(None) => SessionState::Unauthenticated,
            Ok(Some(identity)) if identity.is_well_formed() => {
                info!(target: "portal::session", user = %identity.username, "session restored");
                SessionState::Authenticated(identity)
            }
            Ok(Some(_)) => {
                warn!(target: "portal::session", "stored session has an empty username; discarding");
                self.discard_record();
                SessionState::Unauthenticated
            }
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!(target: "portal::session", "{}; discarding", e);
                self.discard_record();
                SessionState::Unauthenticated
            }
            Err(e) => {
                warn!(target: "portal::session", "error reading stored session: {}", e);
                SessionState::Unauthenticated
            }
        };
        self.state.clone()
    }

    /// Check the credential and sign in. Persistence happens before the state changes, so
    /// a failed write leaves both untouched and reports `false`.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        let Some(identity) = self.provider.verify(username, password) else {
            debug!(target: "portal::session", "login rejected");
            return false;
        };
        if let Err(e) = encode_record(&identity).and_then(|encoded| self.backend.set(SESSION_KEY, &encoded)) {
            warn!(target: "portal::session", "login error: persisting session: {}", e);
            return false;
        }
        info!(target: "portal::session", user = %identity.username, role = %identity.role, "login");
        self.state = SessionState::Authenticated(identity);
        true
    }

    /// Sign out. Always leaves the store unauthenticated, even if the record cannot be deleted.
    pub fn logout(&mut self) {
        if let Some(id) = self.state.identity() {
            info!(target: "portal::session", user = %id.username, "logout");
        }
        self.state = SessionState::Unauthenticated;
        if let Err(e) = self.backend.delete(SESSION_KEY) {
            warn!(target: "portal::session", "logout error: deleting stored session: {}", e);
        }
    }

    fn discard_record(&self) {
        if let Err(e) = self.backend.delete(SESSION_KEY) {
            warn!(target: "portal::session", "failed to delete stored session: {}", e);
        }
    }
}
