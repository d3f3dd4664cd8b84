//! Persistent storage layer for sidechain.
//!
//! This crate provides the ledger store behind the child chain:
//! - Slot records and their lifecycle state
//! - Transaction records, keyed by content hash
//! - The pending set, in submission order
//! - A per-slot index of mined transactions, ordered by block number
//! - The block table
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Application Layer                     │
//! │          (Validator, Block Sealer, Deposit Admission)     │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                   Storage Layer                          │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────┐  │
//! │  │ LedgerState │  │ BlockStore  │  │ Storage (DB)    │  │
//! │  │  - Slots    │  │  - Blocks   │  │  - sled wrapper │  │
//! │  │  - Txs      │  │  - Commits  │  │  - key helpers  │  │
//! │  │  - Pending  │  │             │  │  - sealing lock │  │
//! │  │  - Mined    │  │             │  │                 │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────┘  │
//! └────────────────────────┬────────────────────────────────┘
//!                          │
//! ┌────────────────────────▼────────────────────────────────┐
//! │                    sled Database                         │
//! │              (Embedded Key-Value Store)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Numeric key components use an order-preserving encoding, so block and
//! slot scans come back in numeric order.
//!
//! # Example
//!
//! ```rust,no_run
//! use sidechain_storage::{BlockStore, LedgerState, Storage};
//! use sidechain_core::Uint;
//!
//! let storage = Storage::open("./sidechain_data").unwrap();
//!
//! let state = LedgerState::new(&storage);
//! let latest = state.latest_mined(&Uint::from(1u64)).unwrap();
//!
//! let blocks = BlockStore::new(&storage);
//! let highest = blocks.highest_block_number().unwrap();
//! ```

pub mod chain;
pub mod db;
pub mod state;

// Re-export commonly used types
pub use chain::BlockStore;
pub use db::{BatchOp, Result, Storage, StorageError};
pub use state::{LedgerState, PendingEntry};
