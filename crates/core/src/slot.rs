//! Slot ownership records.

use crate::crypto::Address;
use crate::number::Uint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a slot on the child chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoinState {
    /// Deposited on the root chain and transferable here.
    Deposited,
    /// Spent by an action outside this ledger.
    Spent,
    /// Withdrawn back to the root chain.
    Exited,
}

impl CoinState {
    /// Only deposited slots accept transfers.
    pub fn is_transferable(&self) -> bool {
        matches!(self, CoinState::Deposited)
    }

    /// The upper-case name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoinState::Deposited => "DEPOSITED",
            CoinState::Spent => "SPENT",
            CoinState::Exited => "EXITED",
        }
    }
}

impl fmt::Display for CoinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ownership position tracked by the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot identifier.
    pub slot: Uint,
    /// Current owner: the depositor until a transfer of the slot is mined.
    pub owner: Address,
    /// Current lifecycle state.
    pub state: CoinState,
}

impl Slot {
    /// A freshly deposited slot.
    pub fn deposited(slot: Uint, owner: Address) -> Self {
        Self {
            slot,
            owner,
            state: CoinState::Deposited,
        }
    }
}
