//! Block storage and the commit paths that create blocks.

use crate::db::{BatchOp, Result, Storage, StorageError, BLOCK_PREFIX};
use crate::state::PendingEntry;
use sidechain_core::{Block, Slot, Uint};

/// Manages the block table.
pub struct BlockStore<'a> {
    storage: &'a Storage,
}

impl<'a> BlockStore<'a> {
    /// Create a new BlockStore wrapping the given storage.
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    // =========================================================================
    // Block Queries
    // =========================================================================

    /// Get a block by its number.
    pub fn get_block(&self, block_number: &Uint) -> Result<Option<Block>> {
        self.storage.get(Storage::block_key(block_number))
    }

    /// Check if a block with this number exists.
    pub fn has_block(&self, block_number: &Uint) -> Result<bool> {
        self.storage.contains(Storage::block_key(block_number))
    }

    /// The numerically highest block number, or `None` for an empty chain.
    pub fn highest_block_number(&self) -> Result<Option<Uint>> {
        match self.storage.inner().scan_prefix(BLOCK_PREFIX).keys().next_back() {
            Some(key) => {
                let key = key?;
                let number = Uint::from_index_key(&key[BLOCK_PREFIX.len()..]).ok_or_else(|| {
                    StorageError::Corrupted(format!("block key {:?}", key.as_ref()))
                })?;
                Ok(Some(number))
            }
            None => Ok(None),
        }
    }

    /// All blocks in ascending numeric order.
    pub fn list_blocks(&self) -> Result<Vec<Block>> {
        self.storage
            .inner()
            .scan_prefix(BLOCK_PREFIX)
            .values()
            .map(|value| -> Result<Block> { Ok(bincode::deserialize(&value?)?) })
            .collect()
    }

    pub fn block_count(&self) -> usize {
        self.storage.inner().scan_prefix(BLOCK_PREFIX).count()
    }

    // =========================================================================
    // Commits
    // =========================================================================

    /// Persist a sealed block in one batch.
    ///
    /// Writes the block, each included transaction (now carrying
    /// `mined_block`) and its mined index entry, hands each slot to its
    /// transaction's recipient, and removes `claimed` pending keys. Evicted
    /// entries lose both their pending key and their record.
    pub fn commit_block(
        &self,
        block: &Block,
        claimed: &[Vec<u8>],
        evicted: &[PendingEntry],
    ) -> Result<()> {
        let mut ops = vec![BatchOp::put(Storage::block_key(&block.block_number), block)?];

        for tx in &block.transactions {
            ops.push(BatchOp::put(Storage::transaction_key(&tx.hash), tx)?);
            ops.push(BatchOp::put(
                Storage::mined_key(&tx.slot, &block.block_number),
                &tx.hash,
            )?);

            let slot_key = Storage::slot_key(&tx.slot);
            let mut record: Slot = self.storage.get(&slot_key)?.ok_or_else(|| {
                StorageError::Corrupted(format!("mined slot {} has no record", tx.slot))
            })?;
            record.owner = tx.recipient;
            ops.push(BatchOp::put(slot_key, &record)?);
        }
        for key in claimed {
            ops.push(BatchOp::remove(key.clone()));
        }
        for entry in evicted {
            ops.push(BatchOp::remove(entry.key.clone()));
            ops.push(BatchOp::remove(Storage::transaction_key(&entry.transaction.hash)));
        }

        self.storage.batch(ops)
    }

    /// Persist a deposit: the slot record and a block holding its genesis
    /// transaction, in one batch.
    pub fn commit_deposit(&self, slot: &Slot, block: &Block) -> Result<()> {
        let mut ops = vec![
            BatchOp::put(Storage::slot_key(&slot.slot), slot)?,
            BatchOp::put(Storage::block_key(&block.block_number), block)?,
        ];
        for tx in &block.transactions {
            ops.push(BatchOp::put(Storage::transaction_key(&tx.hash), tx)?);
            ops.push(BatchOp::put(
                Storage::mined_key(&tx.slot, &block.block_number),
                &tx.hash,
            )?);
        }
        self.storage.batch(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LedgerState;
    use sidechain_core::{Address, CoinState, Transaction};

    fn setup() -> Storage {
        Storage::open_temporary().unwrap()
    }

    fn deposit_block(slot: u64, number: u64) -> (Slot, Block) {
        let owner = Address([0x11; 20]);
        let tx = Transaction::deposit(Uint::from(slot), owner, Uint::from(number)).unwrap();
        (
            Slot::deposited(Uint::from(slot), owner),
            Block::seal(Uint::from(number), vec![tx]),
        )
    }

    #[test]
    fn test_empty_chain() {
        let storage = setup();
        let blocks = BlockStore::new(&storage);
        assert_eq!(blocks.highest_block_number().unwrap(), None);
        assert!(blocks.list_blocks().unwrap().is_empty());
        assert_eq!(blocks.block_count(), 0);
    }

    #[test]
    fn test_commit_deposit_writes_everything() {
        let storage = setup();
        let blocks = BlockStore::new(&storage);
        let state = LedgerState::new(&storage);
        let (slot, block) = deposit_block(42, 7);

        blocks.commit_deposit(&slot, &block).unwrap();

        assert_eq!(blocks.get_block(&Uint::from(7u64)).unwrap(), Some(block.clone()));
        assert_eq!(
            state.get_slot(&Uint::from(42u64)).unwrap().unwrap().state,
            CoinState::Deposited
        );
        let latest = state.latest_mined(&Uint::from(42u64)).unwrap().unwrap();
        assert_eq!(latest.mined_block, Some(Uint::from(7u64)));
        assert_eq!(latest.hash, block.transactions[0].hash);
    }

    #[test]
    fn test_highest_and_list_are_numeric() {
        let storage = setup();
        let blocks = BlockStore::new(&storage);
        for (slot, number) in [(1, 9), (2, 10_000), (3, 1_000)] {
            let (slot, block) = deposit_block(slot, number);
            blocks.commit_deposit(&slot, &block).unwrap();
        }

        assert_eq!(blocks.highest_block_number().unwrap(), Some(Uint::from(10_000u64)));
        let numbers: Vec<String> = blocks
            .list_blocks()
            .unwrap()
            .iter()
            .map(|b| b.block_number.to_string())
            .collect();
        assert_eq!(numbers, vec!["9", "1000", "10000"]);
    }

    #[test]
    fn test_commit_block_moves_pending_to_mined() {
        let storage = setup();
        let blocks = BlockStore::new(&storage);
        let state = LedgerState::new(&storage);
        state
            .put_slot(&Slot::deposited(Uint::from(1u64), Address([1; 20])))
            .unwrap();

        let kept = Transaction::transfer(
            Uint::from(1u64),
            Address([1; 20]),
            Address([2; 20]),
            Uint::from(5u64),
        )
        .unwrap();
        let dropped = Transaction::transfer(
            Uint::from(1u64),
            Address([1; 20]),
            Address([3; 20]),
            Uint::from(5u64),
        )
        .unwrap();
        state.insert_pending(&kept).unwrap();
        state.insert_pending(&dropped).unwrap();

        let pending = state.pending_transactions().unwrap();
        let block = Block::seal(Uint::from(1000u64), vec![pending[0].transaction.clone()]);
        blocks
            .commit_block(&block, &[pending[0].key.clone()], &pending[1..])
            .unwrap();

        assert_eq!(state.pending_count(), 0);
        assert!(!state.has_transaction(&dropped.hash).unwrap());
        let stored = state.get_transaction(&kept.hash).unwrap().unwrap();
        assert_eq!(stored.mined_block, Some(Uint::from(1000u64)));
        assert_eq!(
            state.latest_mined(&Uint::from(1u64)).unwrap().unwrap().hash,
            kept.hash
        );
        let slot = state.get_slot(&Uint::from(1u64)).unwrap().unwrap();
        assert_eq!(slot.owner, Address([2; 20]));
        assert_eq!(slot.state, CoinState::Deposited);
    }

    #[test]
    fn test_commit_block_requires_slot_record() {
        let storage = setup();
        let blocks = BlockStore::new(&storage);
        let orphan = Transaction::transfer(
            Uint::from(9u64),
            Address([1; 20]),
            Address([2; 20]),
            Uint::from(5u64),
        )
        .unwrap();

        let block = Block::seal(Uint::from(1000u64), vec![orphan]);
        let result = blocks.commit_block(&block, &[], &[]);
        assert!(matches!(result, Err(StorageError::Corrupted(_))));
        assert!(!blocks.has_block(&Uint::from(1000u64)).unwrap());
    }
}
