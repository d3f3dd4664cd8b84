//! Ledger state: slot records, transaction records, the pending set and the
//! per-slot index of mined transactions.

use crate::db::{Result, Storage, StorageError, PENDING_PREFIX};
use sidechain_core::{CoinState, Hash, Slot, Transaction, Uint};
use sled::transaction::{abort, TransactionError};

/// A pending transaction together with the key that holds its place in the queue.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub key: Vec<u8>,
    pub transaction: Transaction,
}

/// Reads and writes slot and transaction records.
pub struct LedgerState<'a> {
    storage: &'a Storage,
}

impl<'a> LedgerState<'a> {
    /// Create a new LedgerState wrapping the given storage.
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    // =========================================================================
    // Slots
    // =========================================================================

    pub fn get_slot(&self, slot: &Uint) -> Result<Option<Slot>> {
        self.storage.get(Storage::slot_key(slot))
    }

    pub fn slot_exists(&self, slot: &Uint) -> Result<bool> {
        self.storage.contains(Storage::slot_key(slot))
    }

    pub fn put_slot(&self, slot: &Slot) -> Result<()> {
        self.storage.put(Storage::slot_key(&slot.slot), slot)
    }

    /// Change the lifecycle state of an existing slot.
    pub fn set_slot_state(&self, slot: &Uint, state: CoinState) -> Result<Slot> {
        let mut record = self
            .get_slot(slot)?
            .ok_or_else(|| StorageError::NotFound(format!("slot {}", slot)))?;
        record.state = state;
        self.put_slot(&record)?;
        Ok(record)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    pub fn get_transaction(&self, hash: &Hash) -> Result<Option<Transaction>> {
        self.storage.get(Storage::transaction_key(hash))
    }

    pub fn has_transaction(&self, hash: &Hash) -> Result<bool> {
        self.storage.contains(Storage::transaction_key(hash))
    }

    /// Persist a transaction as pending.
    ///
    /// The hash check and both writes happen in one sled transaction, so of two
    /// racing submissions of the same hash exactly one succeeds; the other gets
    /// [`StorageError::DuplicateTransaction`].
    pub fn insert_pending(&self, tx: &Transaction) -> Result<()> {
        let tx_key = Storage::transaction_key(&tx.hash);
        let pending_key = Storage::pending_key(self.storage.next_id()?);
        let record = bincode::serialize(tx)?;
        let pointer = bincode::serialize(&tx.hash)?;

        let outcome = self.storage.inner().transaction(|db| {
            if db.get(&tx_key)?.is_some() {
                return abort(());
            }
            db.insert(tx_key.as_slice(), record.as_slice())?;
            db.insert(pending_key.as_slice(), pointer.as_slice())?;
            Ok(())
        });

        match outcome {
            Ok(()) => Ok(()),
            Err(TransactionError::Abort(())) => Err(StorageError::DuplicateTransaction(tx.hash)),
            Err(TransactionError::Storage(e)) => Err(e.into()),
        }
    }

    /// Pending transactions in submission order.
    pub fn pending_transactions(&self) -> Result<Vec<PendingEntry>> {
        let mut entries = Vec::new();
        for item in self.storage.inner().scan_prefix(PENDING_PREFIX) {
            let (key, value) = item?;
            let hash: Hash = bincode::deserialize(&value)?;
            let transaction = self.get_transaction(&hash)?.ok_or_else(|| {
                StorageError::Corrupted(format!("pending transaction {} has no record", hash))
            })?;
            entries.push(PendingEntry {
                key: key.to_vec(),
                transaction,
            });
        }
        Ok(entries)
    }

    pub fn pending_count(&self) -> usize {
        self.storage.inner().scan_prefix(PENDING_PREFIX).count()
    }

    // =========================================================================
    // Mined Index
    // =========================================================================

    /// The `n`-th most recent mined transaction of `slot` (0 = latest), ordered
    /// numerically by mining block.
    pub fn nth_latest_mined(&self, slot: &Uint, n: usize) -> Result<Option<Transaction>> {
        let prefix = Storage::mined_prefix(slot);
        match self.storage.inner().scan_prefix(prefix).rev().nth(n) {
            Some(item) => {
                let (_, value) = item?;
                let hash: Hash = bincode::deserialize(&value)?;
                let tx = self.get_transaction(&hash)?.ok_or_else(|| {
                    StorageError::Corrupted(format!("mined transaction {} has no record", hash))
                })?;
                Ok(Some(tx))
            }
            None => Ok(None),
        }
    }

    pub fn latest_mined(&self, slot: &Uint) -> Result<Option<Transaction>> {
        self.nth_latest_mined(slot, 0)
    }
}
