//! Block operations command.

use super::open_ledger_storage;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use sidechain_chain::{DepositRequest, Ledger, LedgerConfig, DEFAULT_BLOCK_INTERVAL};
use sidechain_consensus::BlockValidator;
use sidechain_core::{Block, Uint};
use std::path::PathBuf;

#[derive(Args)]
pub struct BlockArgs {
    #[command(subcommand)]
    command: BlockCommand,
}

#[derive(Subcommand)]
enum BlockCommand {
    /// Deposit a slot at a given block number
    Deposit {
        /// Directory holding ledger data and keys
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Slot to introduce
        #[arg(short, long)]
        slot: String,

        /// Block number the deposit lands in
        #[arg(short, long)]
        block_number: String,

        /// Depositor address (hex format)
        #[arg(short, long)]
        owner: String,
    },
    /// Seal pending transfers into a new block
    Mine {
        /// Directory holding ledger data and keys
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Distance between sealed block numbers
        #[arg(long, default_value_t = DEFAULT_BLOCK_INTERVAL)]
        block_interval: u64,
    },
    /// List blocks
    List {
        /// Directory holding ledger data and keys
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,
    },
    /// Show detailed block information
    Info {
        /// Directory holding ledger data and keys
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Block number
        block_number: String,
    },
}

pub fn run(args: BlockArgs) -> Result<()> {
    match args.command {
        BlockCommand::Deposit {
            data_dir,
            slot,
            block_number,
            owner,
        } => deposit(
            data_dir,
            DepositRequest {
                slot,
                block_number,
                owner,
            },
        ),
        BlockCommand::Mine {
            data_dir,
            block_interval,
        } => mine(data_dir, block_interval),
        BlockCommand::List { data_dir } => list_blocks(data_dir),
        BlockCommand::Info {
            data_dir,
            block_number,
        } => show_block_info(data_dir, block_number),
    }
}

fn deposit(data_dir: PathBuf, request: DepositRequest) -> Result<()> {
    let storage = open_ledger_storage(&data_dir)?;
    let ledger = Ledger::new(&storage, LedgerConfig::default());

    let block = ledger.deposit(&request)?;

    println!();
    println!(
        "{}  Deposited slot {} in block {}",
        "✓".green().bold(),
        request.slot.bright_cyan(),
        block.block_number.to_string().bright_cyan()
    );
    println!("    Root: {}", block.root_hash.to_string().bright_black());
    println!();
    Ok(())
}

fn mine(data_dir: PathBuf, block_interval: u64) -> Result<()> {
    let storage = open_ledger_storage(&data_dir)?;
    let config = LedgerConfig::with_block_interval(Uint::from(block_interval));
    let ledger = Ledger::new(&storage, config);

    let pending = ledger.pending_transactions()?.len();
    let block = ledger.mine()?;

    println!();
    println!(
        "{}  Sealed block {}",
        "✓".green().bold(),
        block.block_number.to_string().bright_cyan()
    );
    println!(
        "    Transactions: {} of {} pending",
        block.tx_count().to_string().bright_cyan(),
        pending
    );
    println!("    Root:         {}", block.root_hash.to_string().bright_black());
    println!();
    Ok(())
}

fn list_blocks(data_dir: PathBuf) -> Result<()> {
    let storage = open_ledger_storage(&data_dir)?;
    let ledger = Ledger::new(&storage, LedgerConfig::default());
    let blocks = ledger.list_blocks()?;

    println!();
    println!("{}", "Blocks:".bold().cyan());
    println!();

    if blocks.is_empty() {
        println!("  {}", "No blocks yet.".yellow());
    }
    for block in &blocks {
        println!(
            "  {} {} {}",
            format!("#{}", block.block_number).bright_black(),
            block.root_hash.to_hex()[..16].bright_yellow(),
            format!("({} txs)", block.tx_count()).bright_black()
        );
    }

    println!();
    Ok(())
}

fn show_block_info(data_dir: PathBuf, block_number: String) -> Result<()> {
    let number: Uint = block_number
        .parse()
        .with_context(|| format!("Invalid block number: {}", block_number))?;

    let storage = open_ledger_storage(&data_dir)?;
    let ledger = Ledger::new(&storage, LedgerConfig::default());
    let block = ledger.get_block(&number)?;

    print_block(&block);
    Ok(())
}

fn print_block(block: &Block) {
    println!();
    println!("{}", "Block Information:".bold().cyan());
    println!();
    println!("  Number:       {}", block.block_number.to_string().bright_cyan());
    println!("  Root Hash:    {}", block.root_hash.to_string().bright_yellow());
    println!(
        "  Created:      {}",
        block.created_at.to_rfc3339().bright_black()
    );
    println!(
        "  Transactions: {}",
        block.tx_count().to_string().bright_cyan()
    );
    match BlockValidator::validate_block(block) {
        Ok(()) => println!("  Integrity:    {}", "ok".green()),
        Err(e) => println!("  Integrity:    {}", e.to_string().red()),
    }
    println!();

    if !block.is_empty() {
        println!("{}", "Transactions:".bold());
        println!();
        for (i, tx) in block.transactions.iter().enumerate() {
            println!(
                "  {} slot {} {} -> {}",
                format!("{}.", i + 1).bright_black(),
                tx.slot.to_string().bright_cyan(),
                tx.hash.to_hex()[..16].bright_yellow(),
                tx.recipient.to_hex().bright_black()
            );
        }
        println!();
    }
}
