//! Transfer signing and submission command.

use super::{keys::load_keypair, open_ledger_storage};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use sidechain_chain::{Ledger, LedgerConfig, TransferRequest};
use sidechain_core::{Address, Hash, Keypair, Transaction, Uint};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct TxArgs {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Args)]
struct TransferArgs {
    /// Directory holding ledger data and keys
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Owner keypair name (without .json extension)
    #[arg(short, long)]
    key: String,

    /// Slot to transfer
    #[arg(short, long)]
    slot: String,

    /// Block at which the owner's ownership was finalized
    #[arg(short, long)]
    block_spent: String,

    /// Recipient address (hex format)
    #[arg(short, long)]
    recipient: String,
}

#[derive(Subcommand)]
enum TxCommand {
    /// Sign a transfer and print the submission body
    Sign(TransferArgs),
    /// Sign a transfer and queue it in the local ledger
    Submit(TransferArgs),
    /// Show a transaction
    Info {
        /// Directory holding ledger data and keys
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Transaction hash (hex format)
        hash: String,
    },
}

pub fn run(args: TxArgs) -> Result<()> {
    match args.command {
        TxCommand::Sign(args) => sign(args),
        TxCommand::Submit(args) => submit(args),
        TxCommand::Info { data_dir, hash } => show_info(data_dir, hash),
    }
}

/// Build the wire request for a transfer signed by `keypair`.
pub fn signed_request(
    keypair: &Keypair,
    slot: &str,
    block_spent: &str,
    recipient: &str,
) -> Result<TransferRequest> {
    let slot: Uint = slot.parse().with_context(|| format!("Invalid slot: {}", slot))?;
    let block_spent: Uint = block_spent
        .parse()
        .with_context(|| format!("Invalid block number: {}", block_spent))?;
    let recipient = Address::from_hex(recipient)
        .with_context(|| format!("Invalid address format: {}", recipient))?;

    let tx = Transaction::transfer(slot, keypair.address(), recipient, block_spent)?
        .signed(keypair)?;
    let signature = tx
        .signature
        .map(|s| s.to_string())
        .context("Transaction was not signed")?;

    Ok(TransferRequest {
        slot: tx.slot.to_string(),
        owner: tx.owner.to_hex(),
        recipient: tx.recipient.to_hex(),
        hash: tx.hash.to_string(),
        block_spent: tx.block_spent.to_string(),
        signature,
    })
}

fn request_json(request: &TransferRequest) -> serde_json::Value {
    serde_json::json!({
        "slot": request.slot,
        "owner": request.owner,
        "recipient": request.recipient,
        "hash": request.hash,
        "blockSpent": request.block_spent,
        "signature": request.signature,
    })
}

fn load_request(args: &TransferArgs) -> Result<TransferRequest> {
    let keypair = load_keypair(&args.data_dir, &args.key)?;
    signed_request(&keypair, &args.slot, &args.block_spent, &args.recipient)
}

fn sign(args: TransferArgs) -> Result<()> {
    let request = load_request(&args)?;
    println!("{}", serde_json::to_string_pretty(&request_json(&request))?);
    Ok(())
}

fn submit(args: TransferArgs) -> Result<()> {
    let request = load_request(&args)?;
    let storage = open_ledger_storage(&args.data_dir)?;
    let ledger = Ledger::new(&storage, LedgerConfig::default());

    let tx = ledger.submit_transaction(&request)?;

    println!();
    println!(
        "{}  Transfer queued: {}",
        "✓".green().bold(),
        tx.hash.to_string().bright_yellow()
    );
    println!("    Slot:      {}", tx.slot.to_string().bright_cyan());
    println!("    Recipient: {}", tx.recipient.to_hex().bright_yellow());
    println!();
    Ok(())
}

fn show_info(data_dir: PathBuf, hash: String) -> Result<()> {
    let hash = Hash::from_hex(&hash).with_context(|| format!("Invalid hash: {}", hash))?;
    print_transaction(&data_dir, &hash)
}

fn print_transaction(data_dir: &Path, hash: &Hash) -> Result<()> {
    let storage = open_ledger_storage(data_dir)?;
    let ledger = Ledger::new(&storage, LedgerConfig::default());
    let tx = ledger.get_transaction(hash)?;

    println!();
    println!("{}", "Transaction Information:".bold().cyan());
    println!();
    println!("  Hash:        {}", tx.hash.to_string().bright_yellow());
    println!("  Slot:        {}", tx.slot.to_string().bright_cyan());
    println!("  Owner:       {}", tx.owner.to_hex().bright_yellow());
    println!("  Recipient:   {}", tx.recipient.to_hex().bright_yellow());
    println!("  Block Spent: {}", tx.block_spent.to_string().bright_cyan());
    match &tx.mined_block {
        Some(block) => println!("  Mined In:    {}", block.to_string().bright_cyan()),
        None => println!("  Mined In:    {}", "pending".bright_black()),
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidechain_core::recover;

    #[test]
    fn test_signed_request_recovers_owner() {
        let keypair = Keypair::generate();
        let request = signed_request(
            &keypair,
            "7",
            "1000",
            "0xf62c9Df4c6eC38b9232831548d354BB6A67985eD",
        )
        .unwrap();

        assert_eq!(request.owner, keypair.address().to_hex());
        assert_eq!(request.recipient, "0xf62c9df4c6ec38b9232831548d354bb6a67985ed");

        let hash = Hash::from_hex(&request.hash).unwrap();
        let signature = sidechain_core::Signature::from_hex(&request.signature).unwrap();
        assert_eq!(recover(&hash, &signature).unwrap(), keypair.address());
    }

    #[test]
    fn test_signed_request_rejects_bad_input() {
        let keypair = Keypair::generate();
        assert!(signed_request(&keypair, "x", "1", "0x00").is_err());
        assert!(signed_request(&keypair, "1", "1", "0x00").is_err());
    }

    #[test]
    fn test_request_json_uses_wire_names() {
        let request = signed_request(
            &Keypair::generate(),
            "1",
            "5",
            "0xf62c9Df4c6eC38b9232831548d354BB6A67985eD",
        )
        .unwrap();
        let json = request_json(&request);
        assert_eq!(json["blockSpent"], "5");
        assert_eq!(json["slot"], "1");
    }
}
