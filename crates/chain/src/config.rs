//! Ledger configuration.

use sidechain_core::Uint;

/// Default distance between sealed block numbers.
pub const DEFAULT_BLOCK_INTERVAL: u64 = 1000;

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Sealed block numbers are multiples of this value.
    pub block_interval: Uint,
}

impl LedgerConfig {
    pub fn with_block_interval(block_interval: Uint) -> Self {
        Self { block_interval }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            block_interval: Uint::from(DEFAULT_BLOCK_INTERVAL),
        }
    }
}
