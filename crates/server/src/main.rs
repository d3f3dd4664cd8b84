use anyhow::{Context, Result};
use clap::Parser;
use sidechain_chain::{LedgerConfig, DEFAULT_BLOCK_INTERVAL};
use sidechain_core::Uint;
use sidechain_server::{app, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sidechain ledger HTTP server.
#[derive(Parser, Debug)]
#[command(name = "sidechain-server")]
#[command(about = "Serve the sidechain ledger over HTTP", long_about = None)]
#[command(version)]
struct Config {
    /// Data directory
    #[arg(short, long, env = "SIDECHAIN_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Address to listen on
    #[arg(short, long, env = "SIDECHAIN_LISTEN", default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// Distance between sealed block numbers
    #[arg(long, env = "SIDECHAIN_BLOCK_INTERVAL", default_value_t = DEFAULT_BLOCK_INTERVAL)]
    block_interval: u64,

    /// Log filter directives
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_filter: String,

    /// Keep the ledger in memory only
    #[arg(long)]
    temporary: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ledger_config = LedgerConfig::with_block_interval(Uint::from(config.block_interval));
    let state = if config.temporary {
        AppState::temporary(ledger_config).context("failed to open in-memory store")?
    } else {
        AppState::open(&config.data_dir, ledger_config)
            .with_context(|| format!("failed to open store at {}", config.data_dir.display()))?
    };

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    tracing::info!(
        listen = %config.listen,
        data_dir = %config.data_dir.display(),
        temporary = config.temporary,
        block_interval = config.block_interval,
        "sidechain server listening"
    );

    axum::serve(listener, app(state))
        .await
        .context("server error")?;
    Ok(())
}
