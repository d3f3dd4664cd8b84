//! Transfer admission and sealed-block validation rules.
//!
//! The transfer rules run in a fixed order and stop at the first failure; the
//! rejection message is part of the public contract, so the order matters
//! whenever a request breaks more than one rule.

use sidechain_core::{
    recover, Address, Block, CoinState, Hash, Signature, Transaction, Uint,
};
use std::collections::HashSet;
use thiserror::Error;

/// Named reasons a transfer or deposit is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid slot")]
    InvalidSlot,

    #[error("invalid blockSpent")]
    InvalidBlockSpent,

    #[error("slot is not in side chain")]
    SlotNotInSideChain,

    #[error("last mined block does not exist")]
    LastMinedBlockMissing,

    #[error("blockSpent is invalid")]
    BlockSpentMismatch,

    #[error("hash invalid")]
    HashMismatch,

    #[error("owner does not match")]
    OwnerMismatch,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("coin state is not DEPOSITED")]
    NotDeposited,

    #[error("invalid blockNumber")]
    InvalidBlockNumber,

    #[error("invalid owner")]
    InvalidOwner,

    #[error("slot already deposited")]
    AlreadyDeposited,
}

/// Failure of a transfer check: either the ledger could not be read, or the
/// transfer broke a rule.
#[derive(Debug, Error)]
pub enum TransferError<E> {
    #[error("ledger lookup failed: {0}")]
    Infrastructure(E),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Read access the validator needs from the ledger.
pub trait LedgerView {
    type Error;

    /// The mined transaction of `slot` with the numerically greatest block.
    fn latest_mined(&self, slot: &Uint) -> Result<Option<Transaction>, Self::Error>;

    /// Current lifecycle state of `slot`, if the slot is known.
    fn slot_state(&self, slot: &Uint) -> Result<Option<CoinState>, Self::Error>;
}

/// A transfer as submitted: every field still in its wire form.
#[derive(Debug, Clone, Default)]
pub struct TransferRequest {
    pub slot: String,
    pub owner: String,
    pub recipient: String,
    pub hash: String,
    pub block_spent: String,
    pub signature: String,
}

/// Transaction validator.
pub struct TransferValidator;

impl TransferValidator {
    /// Check `request` against the ledger and return the pending transaction it
    /// describes.
    pub fn validate<V: LedgerView>(
        view: &V,
        request: &TransferRequest,
    ) -> Result<Transaction, TransferError<V::Error>> {
        let (slot, block_spent) = Self::parse_numbers(request)?;

        let last = view
            .latest_mined(&slot)
            .map_err(TransferError::Infrastructure)?
            .ok_or(ValidationError::SlotNotInSideChain)?;

        let mined_block = last
            .mined_block
            .as_ref()
            .ok_or(ValidationError::LastMinedBlockMissing)?;
        if *mined_block != block_spent {
            return Err(ValidationError::BlockSpentMismatch.into());
        }

        let recipient =
            Address::from_hex(&request.recipient).map_err(|_| ValidationError::HashMismatch)?;
        let hash = Self::check_hash(&slot, &block_spent, &recipient, &request.hash)?;

        let owner =
            Address::from_hex(&request.owner).map_err(|_| ValidationError::OwnerMismatch)?;
        if owner != last.recipient {
            return Err(ValidationError::OwnerMismatch.into());
        }

        let signature = Self::check_signature(&hash, &request.signature, &owner)?;

        match view.slot_state(&slot).map_err(TransferError::Infrastructure)? {
            Some(state) if state.is_transferable() => {}
            _ => return Err(ValidationError::NotDeposited.into()),
        }

        Ok(Transaction {
            slot,
            owner,
            recipient,
            hash,
            block_spent,
            signature: Some(signature),
            mined_block: None,
        })
    }

    /// Slots must fit 8 bytes and blockSpent 32 bytes to be hashed.
    fn parse_numbers(request: &TransferRequest) -> Result<(Uint, Uint), ValidationError> {
        let slot: Uint = request
            .slot
            .parse()
            .map_err(|_| ValidationError::InvalidSlot)?;
        if slot.to_be_padded(sidechain_core::hash::SLOT_WIDTH).is_none() {
            return Err(ValidationError::InvalidSlot);
        }

        let block_spent: Uint = request
            .block_spent
            .parse()
            .map_err(|_| ValidationError::InvalidBlockSpent)?;
        if block_spent.to_be_padded(sidechain_core::hash::WORD_WIDTH).is_none() {
            return Err(ValidationError::InvalidBlockSpent);
        }

        Ok((slot, block_spent))
    }

    fn check_hash(
        slot: &Uint,
        block_spent: &Uint,
        recipient: &Address,
        supplied: &str,
    ) -> Result<Hash, ValidationError> {
        let expected = Transaction::compute_hash(slot, block_spent, recipient)
            .map_err(|_| ValidationError::HashMismatch)?;
        match Hash::from_hex(supplied) {
            Ok(hash) if hash == expected => Ok(expected),
            _ => Err(ValidationError::HashMismatch),
        }
    }

    /// Malformed signatures and signatures from anyone but `owner` are the
    /// same rejection.
    fn check_signature(
        hash: &Hash,
        supplied: &str,
        owner: &Address,
    ) -> Result<Signature, ValidationError> {
        let signature =
            Signature::from_hex(supplied).map_err(|_| ValidationError::InvalidSignature)?;
        match recover(hash, &signature) {
            Ok(signer) if signer == *owner => Ok(signature),
            _ => Err(ValidationError::InvalidSignature),
        }
    }
}

/// Structural problems in a sealed block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block root hash does not match its transactions")]
    InvalidRootHash,

    #[error("transactions are not in (slot, hash) order")]
    Unordered,

    #[error("slot {0} appears more than once")]
    DuplicateSlot(Uint),

    #[error("transaction {0} is not marked as mined by this block")]
    WrongMinedBlock(Hash),

    #[error("transaction {0} hash does not match its content")]
    TransactionHashMismatch(Hash),
}

/// Block validator.
pub struct BlockValidator;

impl BlockValidator {
    /// Validate a sealed block's structure and contents.
    pub fn validate_block(block: &Block) -> Result<(), BlockError> {
        let mut seen = HashSet::new();
        for tx in &block.transactions {
            if !seen.insert(&tx.slot) {
                return Err(BlockError::DuplicateSlot(tx.slot.clone()));
            }
            if tx.mined_block.as_ref() != Some(&block.block_number) {
                return Err(BlockError::WrongMinedBlock(tx.hash));
            }
            if !tx.verify_hash() {
                return Err(BlockError::TransactionHashMismatch(tx.hash));
            }
        }

        let ordered = block
            .transactions
            .windows(2)
            .all(|pair| (&pair[0].slot, pair[0].hash) <= (&pair[1].slot, pair[1].hash));
        if !ordered {
            return Err(BlockError::Unordered);
        }

        if !block.verify_root_hash() {
            return Err(BlockError::InvalidRootHash);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidechain_core::Keypair;
    use std::collections::HashMap;

    const OWNER_KEY: &str = "0x379717fa635d3f8b6f6e2ba65440600ed28812ef34edede5420a1befe4d0979d";

    #[derive(Default)]
    struct MemoryView {
        mined: HashMap<Uint, Transaction>,
        states: HashMap<Uint, CoinState>,
    }

    impl MemoryView {
        fn with_deposit(slot: u64, owner: Address, block: u64) -> Self {
            let mut view = Self::default();
            let tx = Transaction::deposit(Uint::from(slot), owner, Uint::from(block)).unwrap();
            view.mined.insert(Uint::from(slot), tx);
            view.states.insert(Uint::from(slot), CoinState::Deposited);
            view
        }
    }

    impl LedgerView for MemoryView {
        type Error = std::convert::Infallible;

        fn latest_mined(&self, slot: &Uint) -> Result<Option<Transaction>, Self::Error> {
            Ok(self.mined.get(slot).cloned())
        }

        fn slot_state(&self, slot: &Uint) -> Result<Option<CoinState>, Self::Error> {
            Ok(self.states.get(slot).copied())
        }
    }

    struct BrokenView;

    impl LedgerView for BrokenView {
        type Error = String;

        fn latest_mined(&self, _slot: &Uint) -> Result<Option<Transaction>, Self::Error> {
            Err("disk on fire".into())
        }

        fn slot_state(&self, _slot: &Uint) -> Result<Option<CoinState>, Self::Error> {
            Err("disk on fire".into())
        }
    }

    fn owner() -> Keypair {
        Keypair::from_hex(OWNER_KEY).unwrap()
    }

    fn recipient() -> Address {
        Address::from_hex("0xf62c9Df4c6eC38b9232831548d354BB6A67985eD").unwrap()
    }

    /// A correctly signed transfer of `slot` spent at `block`.
    fn request(keypair: &Keypair, slot: u64, block: u64) -> TransferRequest {
        let tx = Transaction::transfer(
            Uint::from(slot),
            keypair.address(),
            recipient(),
            Uint::from(block),
        )
        .unwrap()
        .signed(keypair)
        .unwrap();
        TransferRequest {
            slot: slot.to_string(),
            owner: keypair.address().to_hex(),
            recipient: recipient().to_hex(),
            hash: tx.hash.to_string(),
            block_spent: block.to_string(),
            signature: tx.signature.unwrap().to_string(),
        }
    }

    fn rejection<E: std::fmt::Debug>(result: Result<Transaction, TransferError<E>>) -> String {
        match result {
            Err(TransferError::Invalid(reason)) => reason.to_string(),
            other => panic!("expected a rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_transfer_accepted() {
        let keypair = owner();
        let view = MemoryView::with_deposit(1, keypair.address(), 1000);

        let tx = TransferValidator::validate(&view, &request(&keypair, 1, 1000)).unwrap();
        assert_eq!(tx.owner, keypair.address());
        assert_eq!(tx.recipient, recipient());
        assert!(!tx.is_mined());
        assert_eq!(tx.signer(), Some(Ok(keypair.address())));
    }

    #[test]
    fn test_case_insensitive_fields() {
        let keypair = owner();
        let view = MemoryView::with_deposit(1, keypair.address(), 1000);
        let mut req = request(&keypair, 1, 1000);
        req.owner = req.owner.to_uppercase().replacen("0X", "0x", 1);
        req.hash = req.hash.to_uppercase();

        assert!(TransferValidator::validate(&view, &req).is_ok());
    }

    #[test]
    fn test_malformed_numbers() {
        let view = MemoryView::default();
        let mut req = request(&owner(), 1, 1000);
        req.slot = "abc".into();
        assert_eq!(rejection(TransferValidator::validate(&view, &req)), "invalid slot");

        req.slot = "18446744073709551616".into();
        assert_eq!(rejection(TransferValidator::validate(&view, &req)), "invalid slot");

        req.slot = "1".into();
        req.block_spent = "-5".into();
        assert_eq!(rejection(TransferValidator::validate(&view, &req)), "invalid blockSpent");
    }

    #[test]
    fn test_unknown_slot() {
        let view = MemoryView::default();
        let req = request(&owner(), 1, 1000);
        assert_eq!(
            rejection(TransferValidator::validate(&view, &req)),
            "slot is not in side chain"
        );
    }

    #[test]
    fn test_unmined_last_transaction() {
        let keypair = owner();
        let mut view = MemoryView::with_deposit(1, keypair.address(), 1000);
        if let Some(tx) = view.mined.get_mut(&Uint::from(1u64)) {
            tx.mined_block = None;
        }
        assert_eq!(
            rejection(TransferValidator::validate(&view, &request(&keypair, 1, 1000))),
            "last mined block does not exist"
        );
    }

    #[test]
    fn test_block_spent_must_match_numerically() {
        let keypair = owner();
        let view = MemoryView::with_deposit(1, keypair.address(), 1000);
        // Otherwise perfectly valid, but anchored to the wrong checkpoint.
        let req = request(&keypair, 1, 2000);
        assert_eq!(
            rejection(TransferValidator::validate(&view, &req)),
            "blockSpent is invalid"
        );

        let mut padded = request(&keypair, 1, 1000);
        padded.block_spent = "0001000".into();
        assert!(TransferValidator::validate(&view, &padded).is_ok());
    }

    #[test]
    fn test_hash_checked_before_owner() {
        let keypair = owner();
        let view = MemoryView::with_deposit(1, keypair.address(), 1000);
        let mut req = request(&keypair, 1, 1000);
        req.hash = Hash::ZERO.to_string();
        req.owner = Address([7; 20]).to_hex();
        assert_eq!(rejection(TransferValidator::validate(&view, &req)), "hash invalid");

        let mut bad_recipient = request(&keypair, 1, 1000);
        bad_recipient.recipient = "not-an-address".into();
        assert_eq!(
            rejection(TransferValidator::validate(&view, &bad_recipient)),
            "hash invalid"
        );
    }

    #[test]
    fn test_owner_must_be_last_recipient() {
        let keypair = owner();
        let view = MemoryView::with_deposit(1, Address([9; 20]), 1000);
        assert_eq!(
            rejection(TransferValidator::validate(&view, &request(&keypair, 1, 1000))),
            "owner does not match"
        );
    }

    #[test]
    fn test_foreign_signer_rejected() {
        let keypair = owner();
        let view = MemoryView::with_deposit(1, keypair.address(), 1000);
        let forged = request(&Keypair::generate(), 1, 1000);
        let mut req = request(&keypair, 1, 1000);
        req.signature = forged.signature;
        assert_eq!(
            rejection(TransferValidator::validate(&view, &req)),
            "invalid signature"
        );
    }

    #[test]
    fn test_malformed_signature_is_a_rejection() {
        let keypair = owner();
        let view = MemoryView::with_deposit(1, keypair.address(), 1000);
        let zeroed = format!("0x{}", "00".repeat(65));
        for bad in ["", "0x1234", "zz", zeroed.as_str()] {
            let mut req = request(&keypair, 1, 1000);
            req.signature = bad.to_string();
            assert_eq!(
                rejection(TransferValidator::validate(&view, &req)),
                "invalid signature",
                "signature {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_exited_slot_rejected() {
        let keypair = owner();
        let mut view = MemoryView::with_deposit(1, keypair.address(), 1000);
        view.states.insert(Uint::from(1u64), CoinState::Exited);
        assert_eq!(
            rejection(TransferValidator::validate(&view, &request(&keypair, 1, 1000))),
            "coin state is not DEPOSITED"
        );

        view.states.clear();
        assert_eq!(
            rejection(TransferValidator::validate(&view, &request(&keypair, 1, 1000))),
            "coin state is not DEPOSITED"
        );
    }

    #[test]
    fn test_lookup_failure_is_infrastructure() {
        let result = TransferValidator::validate(&BrokenView, &request(&owner(), 1, 1000));
        assert!(matches!(result, Err(TransferError::Infrastructure(e)) if e == "disk on fire"));
    }

    fn deposit(slot: u64) -> Transaction {
        Transaction::deposit(Uint::from(slot), Address([1; 20]), Uint::from(1u64)).unwrap()
    }

    #[test]
    fn test_sealed_block_valid() {
        let block = Block::seal(Uint::from(1000u64), vec![deposit(3), deposit(1)]);
        assert_eq!(BlockValidator::validate_block(&block), Ok(()));
        assert_eq!(
            BlockValidator::validate_block(&Block::seal(Uint::from(1000u64), vec![])),
            Ok(())
        );
    }

    #[test]
    fn test_block_root_tampering_detected() {
        let mut block = Block::seal(Uint::from(1000u64), vec![deposit(1), deposit(2)]);
        block.root_hash = Hash::ZERO;
        assert_eq!(
            BlockValidator::validate_block(&block),
            Err(BlockError::InvalidRootHash)
        );
    }

    #[test]
    fn test_block_duplicate_slot_rejected() {
        let block = Block::seal(Uint::from(1000u64), vec![deposit(1), deposit(1)]);
        assert_eq!(
            BlockValidator::validate_block(&block),
            Err(BlockError::DuplicateSlot(Uint::from(1u64)))
        );
    }

    #[test]
    fn test_block_order_and_mined_marker() {
        let mut block = Block::seal(Uint::from(1000u64), vec![deposit(1), deposit(2)]);
        block.transactions.swap(0, 1);
        assert_eq!(BlockValidator::validate_block(&block), Err(BlockError::Unordered));

        let mut block = Block::seal(Uint::from(1000u64), vec![deposit(1)]);
        block.transactions[0].mined_block = Some(Uint::from(2000u64));
        assert!(matches!(
            BlockValidator::validate_block(&block),
            Err(BlockError::WrongMinedBlock(_))
        ));
    }
}
