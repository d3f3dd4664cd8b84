//! Admission rules for sidechain.
//!
//! This crate decides whether a proposed transfer may enter the chain:
//! - Number parsing and width checks for slot and blockSpent
//! - Anchoring to the slot's latest mined checkpoint
//! - Content-hash and ownership-chain continuity checks
//! - Signer recovery against the current owner
//! - Coin state eligibility
//!
//! It also checks the structure of sealed blocks.
//!
//! The validator only reads the ledger, through [`LedgerView`], so it can be
//! exercised against any backing store.
//!
//! # Example
//!
//! ```rust,no_run
//! use sidechain_consensus::{LedgerView, TransferRequest, TransferValidator};
//!
//! fn admit<V: LedgerView>(view: &V, request: &TransferRequest) -> bool
//! where
//!     V::Error: std::fmt::Debug,
//! {
//!     TransferValidator::validate(view, request).is_ok()
//! }
//! ```

pub mod validator;

// Re-export commonly used types
pub use validator::{
    BlockError, BlockValidator, LedgerView, TransferError, TransferRequest, TransferValidator,
    ValidationError,
};
