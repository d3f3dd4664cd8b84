//! Slot transfers and deposit genesis transactions.

use crate::crypto::{recover, Address, CryptoError, Keypair, Signature};
use crate::hash::{hash, slot_leaf, transaction_hash, Hash, DENOMINATION};
use crate::number::Uint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during transaction construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("slot {0} does not fit 64 bits")]
    SlotOutOfRange(Uint),
    #[error("block number {0} does not fit 256 bits")]
    BlockOutOfRange(Uint),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// A transfer of one slot, or the genesis transaction of a deposit.
///
/// The transaction's identity is its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Slot being transferred.
    pub slot: Uint,
    /// Sender (current owner).
    pub owner: Address,
    /// New owner.
    pub recipient: Address,
    /// `transaction_hash(slot, block_spent, 1, recipient)`.
    pub hash: Hash,
    /// Block at which the sender's ownership was finalized (zero for deposits).
    pub block_spent: Uint,
    /// Owner's signature over `hash` (absent for deposits).
    pub signature: Option<Signature>,
    /// Block that mined this transaction, once sealed.
    pub mined_block: Option<Uint>,
}

impl Transaction {
    /// Compute the canonical content hash.
    pub fn compute_hash(
        slot: &Uint,
        block_spent: &Uint,
        recipient: &Address,
    ) -> Result<Hash, TransactionError> {
        if slot.to_be_padded(crate::hash::SLOT_WIDTH).is_none() {
            return Err(TransactionError::SlotOutOfRange(slot.clone()));
        }
        transaction_hash(slot, block_spent, &Uint::from(DENOMINATION), recipient)
            .ok_or_else(|| TransactionError::BlockOutOfRange(block_spent.clone()))
    }

    /// Create an unsigned, pending transfer.
    pub fn transfer(
        slot: Uint,
        owner: Address,
        recipient: Address,
        block_spent: Uint,
    ) -> Result<Self, TransactionError> {
        let hash = Self::compute_hash(&slot, &block_spent, &recipient)?;
        Ok(Self {
            slot,
            owner,
            recipient,
            hash,
            block_spent,
            signature: None,
            mined_block: None,
        })
    }

    /// Create the genesis transaction of a deposit, already mined at `block_number`.
    pub fn deposit(
        slot: Uint,
        depositor: Address,
        block_number: Uint,
    ) -> Result<Self, TransactionError> {
        if block_number.to_be_padded(crate::hash::WORD_WIDTH).is_none() {
            return Err(TransactionError::BlockOutOfRange(block_number));
        }
        let mut tx = Self::transfer(slot, depositor, depositor, Uint::zero())?;
        tx.mined_block = Some(block_number);
        Ok(tx)
    }

    /// Sign the transaction hash with the given keypair.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<(), TransactionError> {
        self.signature = Some(keypair.sign_hash(&self.hash)?);
        Ok(())
    }

    /// Create a signed transaction.
    pub fn signed(mut self, keypair: &Keypair) -> Result<Self, TransactionError> {
        self.sign(keypair)?;
        Ok(self)
    }

    /// Recover the signer, if a signature is present.
    pub fn signer(&self) -> Option<Result<Address, CryptoError>> {
        self.signature.as_ref().map(|sig| recover(&self.hash, sig))
    }

    /// Check whether the stored hash matches the content.
    pub fn verify_hash(&self) -> bool {
        Self::compute_hash(&self.slot, &self.block_spent, &self.recipient)
            .map(|h| h == self.hash)
            .unwrap_or(false)
    }

    /// Check if this transaction has been sealed into a block.
    pub fn is_mined(&self) -> bool {
        self.mined_block.is_some()
    }

    /// Merkle leaf of this transaction in a block: `keccak256(slot)`.
    pub fn leaf(&self) -> Hash {
        // Constructors reject slots wider than 64 bits.
        slot_leaf(&self.slot).unwrap_or_else(|| hash(&self.slot.to_be_bytes()))
    }
}
