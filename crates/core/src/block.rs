//! Sealed blocks.

use crate::hash::Hash;
use crate::merkle::{block_root, MerkleProof, MerkleTree};
use crate::number::Uint;
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable, numbered batch of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block number.
    pub block_number: Uint,
    /// Merkle root over the included transactions' slot leaves.
    pub root_hash: Hash,
    /// Included transactions, ordered by (slot, hash).
    pub transactions: Vec<Transaction>,
    /// When the block was sealed.
    pub created_at: DateTime<Utc>,
}

impl Block {
    /// Seal `transactions` into a block numbered `block_number`.
    ///
    /// Transactions are put in canonical order and marked as mined by this block.
    pub fn seal(block_number: Uint, mut transactions: Vec<Transaction>) -> Self {
        transactions.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.hash.cmp(&b.hash)));
        for tx in &mut transactions {
            tx.mined_block = Some(block_number.clone());
        }
        let root_hash = block_root(&transactions);

        Self {
            block_number,
            root_hash,
            transactions,
            created_at: Utc::now(),
        }
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Verify the root hash matches the transactions.
    pub fn verify_root_hash(&self) -> bool {
        block_root(&self.transactions) == self.root_hash
    }

    /// Inclusion proof for the transaction of `slot`, if present.
    pub fn proof_for_slot(&self, slot: &Uint) -> Option<MerkleProof> {
        let index = self.transactions.iter().position(|tx| &tx.slot == slot)?;
        MerkleTree::from_transactions(&self.transactions).proof(index)
    }
}
