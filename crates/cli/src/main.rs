//! sidechain CLI entry point.

use clap::Parser;
use colored::Colorize;

mod commands;

#[derive(Parser)]
#[command(name = "sidechain")]
#[command(about = "Operate a local child-chain ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<commands::Commands>,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(cmd) => {
            if let Err(e) = commands::run(cmd) {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        None => {
            println!("sidechain - A child-chain ledger for slot transfers");
            println!("Run 'sidechain --help' for usage information.");
        }
    }
}
