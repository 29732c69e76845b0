//!
//! portal server binary
//! --------------------
//! Command-line entry point. Every flag has an environment fallback.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use harness_portal::config::{PortalConfig, DEFAULT_DATA_DIR, DEFAULT_HTTP_PORT};
use harness_portal::flags::FlagSet;
use harness_portal::storage::PersistenceKind;

#[derive(Parser, Debug)]
#[command(name = "harness-portal")]
#[command(about = "Login-protected DevOps dashboard")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "PORTAL_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// HTTP port
    #[arg(long, env = "PORTAL_HTTP_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    port: u16,

    /// Session persistence backend: memory or file
    #[arg(long, env = "PORTAL_PERSISTENCE", default_value = "file")]
    persistence: PersistenceKind,

    /// Directory used by the file backend
    #[arg(long, env = "PORTAL_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Feature flag, `name=bool` or bare `name`; repeatable. Overrides PORTAL_FLAG_* variables.
    #[arg(long = "flag", value_parser = FlagSet::parse_assignment)]
    flags: Vec<(String, bool)>,
}

impl Args {
    fn into_config(self) -> PortalConfig {
        let mut cli_flags = FlagSet::new();
        for (k, v) in &self.flags {
            cli_flags.set(k, *v);
        }
        PortalConfig {
            bind: self.bind,
            http_port: self.port,
            persistence: self.persistence,
            data_dir: self.data_dir,
            flags: FlagSet::from_env().merged(&cli_flags),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(target: "startup", "harness-portal {}: RUST_LOG='{}'", env!("CARGO_PKG_VERSION"), rust_log);

    harness_portal::server::run_with_config(args.into_config()).await
}
