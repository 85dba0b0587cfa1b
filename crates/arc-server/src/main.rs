//! `arc-server` — the long-lived process that owns the issue graph
//! database and exposes it over HTTP.

use std::path::PathBuf;

use arc_server::ServerConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run the Arc HTTP API server.
#[derive(Parser, Debug)]
#[command(name = "arc-server", version, about)]
struct Args {
    /// Path to a TOML config file, layered under defaults and above by
    /// `ARC_`-prefixed environment variables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the data directory (holds `data.db`).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the listen address.
    #[arg(long)]
    bind_addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }

    let bind_addr = config.bind_addr.clone();
    let router = arc_server::build(config)?;
    arc_server::serve(router, &bind_addr).await?;

    tracing::info!("arc-server stopped");
    Ok(())
}
