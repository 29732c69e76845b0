//! Runtime configuration for the portal server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::flags::FlagSet;
use crate::storage::PersistenceKind;

pub const DEFAULT_HTTP_PORT: u16 = 7878;
pub const DEFAULT_DATA_DIR: &str = "portal-data";

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub bind: IpAddr,
    pub http_port: u16,
    /// Backend the session store persists through.
    pub persistence: PersistenceKind,
    /// Root folder of the `file` backend.
    pub data_dir: PathBuf,
    /// Flags applied to every request before query overrides.
    pub flags: FlagSet,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([0, 0, 0, 0]),
            http_port: DEFAULT_HTTP_PORT,
            persistence: PersistenceKind::File,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            flags: FlagSet::new(),
        }
    }
}

impl PortalConfig {
    pub fn addr(&self) -> SocketAddr { SocketAddr::new(self.bind, self.http_port) }

    pub fn validate(&self) -> Result<()> {
        if self.persistence == PersistenceKind::File && self.data_dir.as_os_str().is_empty() {
            bail!("the file persistence backend needs a data directory");
        }
        Ok(())
    }
}
