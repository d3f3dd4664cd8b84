//! CLI commands module.

use anyhow::{Context, Result};
use clap::Subcommand;
use sidechain_storage::Storage;
use std::path::Path;

mod block;
mod keys;
mod tx;

#[derive(Subcommand)]
pub enum Commands {
    /// Key management
    Keys(keys::KeysArgs),
    /// Transfer operations
    Tx(tx::TxArgs),
    /// Block operations
    Block(block::BlockArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Keys(args) => keys::run(args),
        Commands::Tx(args) => tx::run(args),
        Commands::Block(args) => block::run(args),
    }
}

/// Open the ledger store kept in `data_dir`.
fn open_ledger_storage(data_dir: &Path) -> Result<Storage> {
    Storage::open(data_dir)
        .with_context(|| format!("Failed to open ledger at {}", data_dir.display()))
}
