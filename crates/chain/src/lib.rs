//! Ledger orchestration for sidechain.
//!
//! This crate brings together all components of the child chain:
//! - **History**: numeric-order lookups over each slot's mined transactions
//! - **Sealer**: claims pending transfers and seals them into numbered blocks
//! - **Deposits**: introduces new slots with their genesis transaction
//! - **Ledger**: the facade used by the server and the CLI
//!
//! # Example
//!
//! ```rust,no_run
//! use sidechain_chain::{DepositRequest, Ledger, LedgerConfig};
//! use sidechain_storage::Storage;
//!
//! let storage = Storage::open("./sidechain_data").unwrap();
//! let ledger = Ledger::new(&storage, LedgerConfig::default());
//!
//! ledger
//!     .deposit(&DepositRequest {
//!         slot: "1".into(),
//!         block_number: "1".into(),
//!         owner: "0xf62c9df4c6ec38b9232831548d354bb6a67985ed".into(),
//!     })
//!     .unwrap();
//!
//! let block = ledger.mine().unwrap();
//! assert_eq!(block.block_number.to_string(), "1000");
//! ```

pub mod config;
pub mod deposit;
pub mod error;
pub mod history;
pub mod ledger;
pub mod sealer;

// Re-export commonly used types
pub use config::{LedgerConfig, DEFAULT_BLOCK_INTERVAL};
pub use deposit::{Deposit, DepositAdmission, DepositRequest};
pub use error::{ChainError, ErrorKind, Result};
pub use history::ChainHistory;
pub use ledger::{Ledger, LedgerStats, SlotHistory};
pub use sealer::{next_block_number, BlockSealer};
pub use sidechain_consensus::TransferRequest;
