//! Read-only queries over mined transactions.

use sidechain_consensus::LedgerView;
use sidechain_core::{CoinState, Transaction, Uint};
use sidechain_storage::{LedgerState, Storage, StorageError};

/// Mined history of slots, ordered numerically by mining block.
pub struct ChainHistory<'a> {
    state: LedgerState<'a>,
}

impl<'a> ChainHistory<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            state: LedgerState::new(storage),
        }
    }

    /// The mined transaction of `slot` with the greatest block number.
    pub fn latest_mined(&self, slot: &Uint) -> Result<Option<Transaction>, StorageError> {
        self.state.latest_mined(slot)
    }

    /// The mined transaction of `slot` with the second-greatest block number.
    pub fn second_latest_mined(&self, slot: &Uint) -> Result<Option<Transaction>, StorageError> {
        self.state.nth_latest_mined(slot, 1)
    }
}

impl LedgerView for ChainHistory<'_> {
    type Error = StorageError;

    fn latest_mined(&self, slot: &Uint) -> Result<Option<Transaction>, Self::Error> {
        self.state.latest_mined(slot)
    }

    fn slot_state(&self, slot: &Uint) -> Result<Option<CoinState>, Self::Error> {
        Ok(self.state.get_slot(slot)?.map(|record| record.state))
    }
}
