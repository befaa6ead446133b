//! Kube Dispatch - server entry point
//!
//! Loads configuration, installs logging and serves the dispatch endpoint.

use clap::Parser;
use kube_dispatch::core::config::DispatchConfig;
use kube_dispatch::core::error::Result;
use kube_dispatch::server;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Dispatch server - renders registry instructions and runs them with kubectl
#[derive(Parser, Debug)]
#[command(name = "kube-dispatch")]
#[command(about = "Serve the instruction dispatch endpoint")]
struct Args {
    /// TOML config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Per-command timeout in milliseconds, 0 for none (overrides the config file)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Program to run in place of kubectl, with any leading arguments
    #[arg(long, num_args = 1.., value_delimiter = ' ')]
    tool: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kube_dispatch=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DispatchConfig::load(path)?,
        None => DispatchConfig::default(),
    };
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.command_timeout_ms = timeout_ms;
    }
    if let Some(tool) = args.tool {
        config.tool = tool;
    }

    tracing::info!(
        listen = %config.listen,
        tool = ?config.tool,
        timeout_ms = config.command_timeout_ms,
        "kube-dispatch starting"
    );

    server::run(&config).await
}
