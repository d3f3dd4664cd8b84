//! Deposit admission: introducing a slot into the chain.

use crate::error::{ChainError, Result};
use sidechain_consensus::ValidationError;
use sidechain_core::hash::{SLOT_WIDTH, WORD_WIDTH};
use sidechain_core::{Address, Block, Slot, Transaction, Uint};
use sidechain_storage::{BlockStore, LedgerState, Storage};
use tracing::info;

/// A deposit as submitted: every field still in its wire form.
#[derive(Debug, Clone, Default)]
pub struct DepositRequest {
    pub slot: String,
    pub block_number: String,
    pub owner: String,
}

/// A deposit whose fields are well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub slot: Uint,
    pub block_number: Uint,
    pub owner: Address,
}

impl DepositRequest {
    /// Parse the raw fields.
    pub fn parse(&self) -> std::result::Result<Deposit, ValidationError> {
        let slot: Uint = self.slot.parse().map_err(|_| ValidationError::InvalidSlot)?;
        if slot.to_be_padded(SLOT_WIDTH).is_none() {
            return Err(ValidationError::InvalidSlot);
        }

        let block_number: Uint = self
            .block_number
            .parse()
            .map_err(|_| ValidationError::InvalidBlockNumber)?;
        // Genesis records spend block 0, so no block may carry that number.
        if block_number.is_zero() || block_number.to_be_padded(WORD_WIDTH).is_none() {
            return Err(ValidationError::InvalidBlockNumber);
        }

        let owner = Address::from_hex(&self.owner).map_err(|_| ValidationError::InvalidOwner)?;

        Ok(Deposit {
            slot,
            block_number,
            owner,
        })
    }
}

/// Writes deposits: a DEPOSITED slot record plus a block at the requested
/// number holding the slot's genesis transaction.
pub struct DepositAdmission<'a> {
    storage: &'a Storage,
}

impl<'a> DepositAdmission<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn admit(&self, request: &DepositRequest) -> Result<Block> {
        let deposit = request.parse()?;

        let _guard = self.storage.exclusive()?;
        let blocks = BlockStore::new(self.storage);
        let state = LedgerState::new(self.storage);

        if blocks.has_block(&deposit.block_number)? {
            return Err(ChainError::Conflict(format!(
                "block {} already exists",
                deposit.block_number
            )));
        }
        if state.slot_exists(&deposit.slot)? {
            return Err(ValidationError::AlreadyDeposited.into());
        }

        let genesis = Transaction::deposit(
            deposit.slot.clone(),
            deposit.owner,
            deposit.block_number.clone(),
        )
        .map_err(|_| ValidationError::InvalidSlot)?;
        let block = Block::seal(deposit.block_number, vec![genesis]);
        let slot = Slot::deposited(deposit.slot, deposit.owner);

        blocks.commit_deposit(&slot, &block)?;

        info!(
            slot = %slot.slot,
            owner = %slot.owner,
            block_number = %block.block_number,
            "deposited slot"
        );
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(slot: &str, block: &str, owner: &str) -> DepositRequest {
        DepositRequest {
            slot: slot.into(),
            block_number: block.into(),
            owner: owner.into(),
        }
    }

    const OWNER: &str = "0xf62c9Df4c6eC38b9232831548d354BB6A67985eD";

    #[test]
    fn test_parse_rejections() {
        assert_eq!(request("", "1", OWNER).parse(), Err(ValidationError::InvalidSlot));
        assert_eq!(
            request("18446744073709551616", "1", OWNER).parse(),
            Err(ValidationError::InvalidSlot)
        );
        assert_eq!(
            request("1", "1.5", OWNER).parse(),
            Err(ValidationError::InvalidBlockNumber)
        );
        assert_eq!(request("1", "1", "0x12").parse(), Err(ValidationError::InvalidOwner));
    }

    #[test]
    fn test_block_zero_is_rejected() {
        assert_eq!(
            request("1", "0", OWNER).parse(),
            Err(ValidationError::InvalidBlockNumber)
        );
        assert_eq!(
            request("1", " 000 ", OWNER).parse(),
            Err(ValidationError::InvalidBlockNumber)
        );
        assert!(request("1", "1", OWNER).parse().is_ok());
    }

    #[test]
    fn test_parse_large_numbers() {
        let deposit = request("10000000000000000000", "90000000000000000001", OWNER)
            .parse()
            .unwrap();
        assert_eq!(deposit.slot.to_string(), "10000000000000000000");
        assert_eq!(deposit.block_number.to_string(), "90000000000000000001");
        assert_eq!(deposit.owner, Address::from_hex(OWNER).unwrap());
    }

    #[test]
    fn test_admit_then_conflicts() {
        let storage = Storage::open_temporary().unwrap();
        let admission = DepositAdmission::new(&storage);

        let block = admission.admit(&request("1", "5", OWNER)).unwrap();
        assert_eq!(block.tx_count(), 1);
        assert_eq!(block.block_number, Uint::from(5u64));

        let same_block = admission.admit(&request("2", "5", OWNER)).unwrap_err();
        assert_eq!(same_block.to_string(), "block 5 already exists");

        let same_slot = admission.admit(&request("1", "6", OWNER)).unwrap_err();
        assert!(matches!(
            same_slot,
            ChainError::Rejected(ValidationError::AlreadyDeposited)
        ));
    }
}
