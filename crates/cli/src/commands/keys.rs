//! Key management command.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use sidechain_core::Keypair;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct KeysArgs {
    #[command(subcommand)]
    command: KeysCommand,
}

#[derive(Subcommand)]
enum KeysCommand {
    /// Generate a new keypair
    New {
        /// Directory holding ledger data and keys
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,

        /// Name for the keypair file
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List all keypairs
    List {
        /// Directory holding ledger data and keys
        #[arg(short, long, default_value = "./data")]
        data_dir: PathBuf,
    },
}

pub fn run(args: KeysArgs) -> Result<()> {
    match args.command {
        KeysCommand::New { data_dir, name } => new_keypair(data_dir, name),
        KeysCommand::List { data_dir } => list_keypairs(data_dir),
    }
}

fn new_keypair(data_dir: PathBuf, name: Option<String>) -> Result<()> {
    let keypair = Keypair::generate();
    let address = keypair.address();

    println!("{}", "Generated new keypair:".bold().cyan());
    println!();
    println!("  Address:     {}", address.to_hex().bright_yellow());
    println!(
        "  Private Key: {}",
        hex::encode(keypair.private_key()).bright_black()
    );

    let key_file = save_keypair(&data_dir, name.as_deref(), &keypair)?;

    println!();
    println!(
        "{}  Saved to: {}",
        "✓".green().bold(),
        key_file.display().to_string().bright_black()
    );
    println!();
    println!("{}", "Keep your private key safe!".yellow().bold());

    Ok(())
}

/// Write `keypair` to `<data_dir>/keys/<name>.json`.
pub fn save_keypair(data_dir: &Path, name: Option<&str>, keypair: &Keypair) -> Result<PathBuf> {
    let keys_dir = data_dir.join("keys");
    fs::create_dir_all(&keys_dir)?;

    let address = keypair.address().to_hex();
    let filename = match name {
        Some(n) => format!("{}.json", n),
        None => format!("key_{}.json", &address[2..10]),
    };

    let key_file = keys_dir.join(&filename);
    if key_file.exists() {
        bail!("Keypair file already exists: {}", key_file.display());
    }
    let key_json = serde_json::json!({
        "address": address,
        "private_key": hex::encode(keypair.private_key()),
    });
    fs::write(&key_file, serde_json::to_string_pretty(&key_json)?)?;

    Ok(key_file)
}

fn list_keypairs(data_dir: PathBuf) -> Result<()> {
    let keys_dir = data_dir.join("keys");

    if !keys_dir.exists() {
        println!("{}", "No keypairs found.".yellow());
        println!(
            "Use {} to create a new keypair.",
            "sidechain keys new".bright_cyan()
        );
        return Ok(());
    }

    println!("{}", "Saved Keypairs:".bold().cyan());
    println!();

    let mut count = 0;
    for entry in fs::read_dir(&keys_dir)? {
        let path = entry?.path();

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            let contents = fs::read_to_string(&path)?;
            let json: serde_json::Value = serde_json::from_str(&contents)?;

            if let Some(address) = json.get("address").and_then(|v| v.as_str()) {
                count += 1;
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                println!(
                    "  {} {}",
                    format!("{}:", stem).bright_black(),
                    address.bright_yellow()
                );
            }
        }
    }

    if count == 0 {
        println!("  {}", "No keypairs found.".yellow());
    }

    println!();
    Ok(())
}

/// Load the keypair saved under `<data_dir>/keys/<name>.json`.
pub fn load_keypair(data_dir: &Path, name: &str) -> Result<Keypair> {
    let key_file = data_dir.join("keys").join(format!("{}.json", name));
    if !key_file.exists() {
        bail!(
            "Keypair file not found: {}. Use 'sidechain keys new' to create one.",
            key_file.display()
        );
    }

    let contents = fs::read_to_string(&key_file)?;
    let json: serde_json::Value = serde_json::from_str(&contents)?;

    let private_key_hex = json
        .get("private_key")
        .and_then(|v| v.as_str())
        .context("Missing private_key in keypair file")?;

    Keypair::from_hex(private_key_hex).context("Failed to create keypair from private key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_keypair() {
        let dir = tempfile::tempdir().unwrap();
        let keypair = Keypair::generate();

        let path = save_keypair(dir.path(), Some("alice"), &keypair).unwrap();
        assert!(path.ends_with("keys/alice.json"));

        let loaded = load_keypair(dir.path(), "alice").unwrap();
        assert_eq!(loaded.address(), keypair.address());
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        save_keypair(dir.path(), Some("bob"), &Keypair::generate()).unwrap();
        assert!(save_keypair(dir.path(), Some("bob"), &Keypair::generate()).is_err());
    }

    #[test]
    fn test_missing_keypair() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_keypair(dir.path(), "nobody").is_err());
    }
}
