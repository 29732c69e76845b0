//! Feature flags for view variants. Flags never influence authentication; they only
//! pick which variant of a page is rendered.

use std::collections::{BTreeMap, HashMap};

/// Switches the login page and dashboard to the admin experience.
pub const ADMIN_UI: &str = "adminUI";

/// Environment prefix for configured flags, e.g. `PORTAL_FLAG_ADMINUI=true`.
pub const ENV_PREFIX: &str = "PORTAL_FLAG_";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Login,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Standard,
    Admin,
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

impl FlagSet {
    pub fn new() -> Self { Self::default() }

    /// Keys are case-insensitive; stored lowercased.
    pub fn set(&mut self, key: &str, enabled: bool) {
        self.flags.insert(key.to_ascii_lowercase(), enabled);
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.flags.get(&key.to_ascii_lowercase()).copied().unwrap_or(false)
    }

    /// Parse `key=bool` (or a bare `key`, meaning true).
    pub fn parse_assignment(assignment: &str) -> Result<(String, bool), String> {
        let (key, value) = match assignment.split_once('=') {
            Some((k, v)) => (k.trim(), parse_bool(v).ok_or_else(|| format!("invalid flag value in '{}'", assignment))?),
            None => (assignment.trim(), true),
        };
        if key.is_empty() {
            return Err(format!("empty flag name in '{}'", assignment));
        }
        Ok((key.to_string(), value))
    }

    /// Collect `PORTAL_FLAG_<KEY>` pairs; unparsable values are ignored.
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut set = FlagSet::new();
        for (k, v) in vars {
            let Some(name) = k.as_ref().strip_prefix(ENV_PREFIX) else { continue };
            if name.is_empty() { continue; }
            if let Some(b) = parse_bool(v.as_ref()) {
                set.set(name, b);
            }
        }
        set
    }

    pub fn from_env() -> Self { Self::from_env_vars(std::env::vars()) }

    /// Later sets win.
    pub fn merged(&self, other: &FlagSet) -> FlagSet {
        let mut out = self.clone();
        out.flags.extend(other.flags.iter().map(|(k, v)| (k.clone(), *v)));
        out
    }

    /// Apply per-request query overrides: a present parameter is enabled iff its value is `true`.
    pub fn with_overrides(&self, query: &HashMap<String, String>) -> FlagSet {
        let mut out = self.clone();
        for (k, v) in query {
            if k.eq_ignore_ascii_case(ADMIN_UI) || out.flags.contains_key(&k.to_ascii_lowercase()) {
                out.set(k, v == "true");
            }
        }
        out
    }
}

/// Which variant of `view` to render under `flags`.
pub fn select_variant(flags: &FlagSet, view: ViewKind) -> Variant {
    match view {
        ViewKind::Login | ViewKind::Dashboard if flags.is_enabled(ADMIN_UI) => Variant::Admin,
        _ => Variant::Standard,
    }
}
