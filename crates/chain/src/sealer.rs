//! Block sealing.
//!
//! One call seals exactly one block. The block number is allocated, the
//! pending set is claimed and the block is written while the store's sealing
//! lock is held, so concurrent sealers never share a number or a transaction.

use crate::config::LedgerConfig;
use crate::error::Result;
use sidechain_core::{Block, Transaction, Uint};
use sidechain_storage::{BlockStore, LedgerState, PendingEntry, Storage};
use std::collections::HashSet;
use tracing::{info, warn};

/// Seals pending transactions into numbered blocks.
pub struct BlockSealer<'a> {
    storage: &'a Storage,
    config: &'a LedgerConfig,
}

impl<'a> BlockSealer<'a> {
    pub fn new(storage: &'a Storage, config: &'a LedgerConfig) -> Self {
        Self { storage, config }
    }

    /// Seal every eligible pending transaction into a new block.
    ///
    /// An empty pending set still produces an empty block and advances the
    /// block counter.
    pub fn seal(&self) -> Result<Block> {
        let _guard = self.storage.exclusive()?;

        let blocks = BlockStore::new(self.storage);
        let state = LedgerState::new(self.storage);

        let block_number = next_block_number(
            blocks.highest_block_number()?.as_ref(),
            &self.config.block_interval,
        );

        let pending = state.pending_transactions()?;
        let (included, claimed, evicted) = self.select(&state, pending)?;

        for entry in &evicted {
            warn!(
                hash = %entry.transaction.hash,
                slot = %entry.transaction.slot,
                "evicting pending transaction that no longer extends its slot"
            );
        }

        let block = Block::seal(block_number, included);
        blocks.commit_block(&block, &claimed, &evicted)?;

        info!(
            block_number = %block.block_number,
            transactions = block.tx_count(),
            evicted = evicted.len(),
            root_hash = %block.root_hash,
            "sealed block"
        );
        Ok(block)
    }

    /// Walk pending entries in submission order, keeping the first transaction
    /// per slot that still extends that slot's chain.
    #[allow(clippy::type_complexity)]
    fn select(
        &self,
        state: &LedgerState<'_>,
        pending: Vec<PendingEntry>,
    ) -> Result<(Vec<Transaction>, Vec<Vec<u8>>, Vec<PendingEntry>)> {
        let mut included = Vec::new();
        let mut claimed = Vec::new();
        let mut evicted = Vec::new();
        let mut taken: HashSet<Uint> = HashSet::new();

        for entry in pending {
            let tx = &entry.transaction;
            let extends = !taken.contains(&tx.slot)
                && match state.latest_mined(&tx.slot)? {
                    Some(last) => {
                        last.mined_block.as_ref() == Some(&tx.block_spent)
                            && last.recipient == tx.owner
                    }
                    None => false,
                };

            if extends {
                taken.insert(tx.slot.clone());
                claimed.push(entry.key);
                included.push(entry.transaction);
            } else {
                evicted.push(entry);
            }
        }

        Ok((included, claimed, evicted))
    }
}

/// The smallest multiple of `interval` strictly above `highest`.
pub fn next_block_number(highest: Option<&Uint>, interval: &Uint) -> Uint {
    match highest {
        Some(highest) => highest.next_multiple_of(interval),
        None => Uint::zero().next_multiple_of(interval),
    }
}
