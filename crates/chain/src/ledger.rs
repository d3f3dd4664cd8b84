//! The ledger facade.
//!
//! This module brings together the store, chain history, the transfer
//! validator, the block sealer and deposit admission.

use crate::config::LedgerConfig;
use crate::deposit::{DepositAdmission, DepositRequest};
use crate::error::{ChainError, Result};
use crate::history::ChainHistory;
use crate::sealer::BlockSealer;
use serde::Serialize;
use sidechain_consensus::{TransferRequest, TransferValidator};
use sidechain_core::{Block, CoinState, Hash, Slot, Transaction, Uint};
use sidechain_storage::{BlockStore, LedgerState, Storage};
use tracing::{debug, info, warn};

/// The two most recent mined transactions of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotHistory {
    pub last: Option<Transaction>,
    pub previous: Option<Transaction>,
}

/// Ledger summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub block_count: usize,
    pub highest_block: Option<Uint>,
    pub pending_transactions: usize,
}

/// Main ledger struct that orchestrates all components.
pub struct Ledger<'a> {
    storage: &'a Storage,
    blocks: BlockStore<'a>,
    state: LedgerState<'a>,
    history: ChainHistory<'a>,
    config: LedgerConfig,
}

impl<'a> Ledger<'a> {
    /// Create a ledger over the given storage.
    pub fn new(storage: &'a Storage, config: LedgerConfig) -> Self {
        Self {
            storage,
            blocks: BlockStore::new(storage),
            state: LedgerState::new(storage),
            history: ChainHistory::new(storage),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Introduce a slot through a deposit block.
    pub fn deposit(&self, request: &DepositRequest) -> Result<Block> {
        DepositAdmission::new(self.storage)
            .admit(request)
            .inspect_err(|err| warn!(slot = %request.slot, %err, "deposit rejected"))
    }

    /// Validate a transfer and persist it as pending.
    pub fn submit_transaction(&self, request: &TransferRequest) -> Result<Transaction> {
        let tx = TransferValidator::validate(&self.history, request)
            .map_err(ChainError::from)
            .inspect_err(|err| warn!(slot = %request.slot, %err, "transfer rejected"))?;

        self.state.insert_pending(&tx).map_err(|err| {
            let err = ChainError::from(err);
            warn!(hash = %tx.hash, %err, "transfer rejected");
            err
        })?;

        debug!(hash = %tx.hash, slot = %tx.slot, "accepted pending transfer");
        Ok(tx)
    }

    /// Seal one block.
    pub fn mine(&self) -> Result<Block> {
        BlockSealer::new(self.storage, &self.config).seal()
    }

    /// Move a slot to another lifecycle state.
    pub fn set_slot_state(&self, slot: &Uint, state: CoinState) -> Result<Slot> {
        let _guard = self.storage.exclusive()?;
        let record = self.state.set_slot_state(slot, state)?;
        info!(slot = %slot, state = %state, "slot state changed");
        Ok(record)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get_block(&self, block_number: &Uint) -> Result<Block> {
        self.blocks
            .get_block(block_number)?
            .ok_or_else(|| ChainError::NotFound(format!("block {} not found", block_number)))
    }

    /// All blocks, ascending by number.
    pub fn list_blocks(&self) -> Result<Vec<Block>> {
        Ok(self.blocks.list_blocks()?)
    }

    pub fn get_transaction(&self, hash: &Hash) -> Result<Transaction> {
        self.state
            .get_transaction(hash)?
            .ok_or_else(|| ChainError::NotFound(format!("transaction {} not found", hash)))
    }

    /// The slot record; `owner` is the recipient of its latest mined transfer.
    pub fn get_slot(&self, slot: &Uint) -> Result<Slot> {
        self.state
            .get_slot(slot)?
            .ok_or_else(|| ChainError::NotFound(format!("slot {} not found", slot)))
    }

    /// Latest and second-latest mined transactions of `slot`.
    pub fn slot_history(&self, slot: &Uint) -> Result<SlotHistory> {
        Ok(SlotHistory {
            last: self.history.latest_mined(slot)?,
            previous: self.history.second_latest_mined(slot)?,
        })
    }

    /// Pending transactions in submission order.
    pub fn pending_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self
            .state
            .pending_transactions()?
            .into_iter()
            .map(|entry| entry.transaction)
            .collect())
    }

    pub fn stats(&self) -> Result<LedgerStats> {
        Ok(LedgerStats {
            block_count: self.blocks.block_count(),
            highest_block: self.blocks.highest_block_number()?,
            pending_transactions: self.state.pending_count(),
        })
    }
}
