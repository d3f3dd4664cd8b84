//! Core child-chain primitives for sidechain.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - Keccak-256 hashing and the transfer content hash
//! - secp256k1 signatures with signer recovery
//! - Arbitrary-precision numbers for slots and block numbers
//! - Slots, transactions and blocks
//! - Merkle roots over a block's transactions

pub mod block;
pub mod crypto;
pub mod hash;
pub mod merkle;
pub mod number;
pub mod slot;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::Block;
pub use crypto::{recover, Address, CryptoError, Keypair, Signature};
pub use hash::{hash, hash_concat, slot_leaf, transaction_hash, Hash, DENOMINATION, H256};
pub use merkle::{block_root, merkle_root, verify_proof, MerkleProof, MerkleTree};
pub use number::{NumberError, Uint};
pub use slot::{CoinState, Slot};
pub use transaction::{Transaction, TransactionError};
