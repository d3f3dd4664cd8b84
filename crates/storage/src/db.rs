//! sled database wrapper with serialization helpers.

use sidechain_core::{Hash, Uint};
use sled::Db;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Transaction {0} already exists")]
    DuplicateTransaction(Hash),

    #[error("Corrupted record: {0}")]
    Corrupted(String),

    #[error("Sealing lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Key prefixes. Every numeric component uses [`Uint::index_key`], so sled's
/// byte order is numeric order.
pub(crate) const SLOT_PREFIX: &[u8] = b"slot:";
pub(crate) const TX_PREFIX: &[u8] = b"tx:";
pub(crate) const PENDING_PREFIX: &[u8] = b"pending:";
pub(crate) const MINED_PREFIX: &[u8] = b"mined:";
pub(crate) const BLOCK_PREFIX: &[u8] = b"block:";

/// Wrapper around sled database with serialization helpers.
pub struct Storage {
    db: Db,
    /// Held by every operation that creates a block.
    exclusive: Mutex<()>,
}

impl Storage {
    /// Open a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self::from_db(db))
    }

    /// Open an in-memory database (for testing).
    pub fn open_temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self::from_db(db))
    }

    fn from_db(db: Db) -> Self {
        Self {
            db,
            exclusive: Mutex::new(()),
        }
    }

    /// Store a serializable value.
    pub fn put<K, V>(&self, key: K, value: &V) -> Result<()>
    where
        K: AsRef<[u8]>,
        V: serde::Serialize,
    {
        let encoded = bincode::serialize(value)?;
        self.db.insert(key, encoded)?;
        Ok(())
    }

    /// Retrieve and deserialize a value.
    pub fn get<K, V>(&self, key: K) -> Result<Option<V>>
    where
        K: AsRef<[u8]>,
        V: serde::de::DeserializeOwned,
    {
        match self.db.get(key)? {
            Some(bytes) => {
                let value = bincode::deserialize(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Check if a key exists.
    pub fn contains<K: AsRef<[u8]>>(&self, key: K) -> Result<bool> {
        Ok(self.db.contains_key(key)?)
    }

    /// Get the underlying sled database (for scans and transactions).
    pub fn inner(&self) -> &Db {
        &self.db
    }

    /// Monotonic id, used to keep the pending set in submission order.
    pub fn next_id(&self) -> Result<u64> {
        Ok(self.db.generate_id()?)
    }

    /// Apply multiple operations atomically.
    ///
    /// sled's `apply_batch` writes the whole batch through its write-ahead log
    /// or none of it.
    pub fn batch(&self, operations: Vec<BatchOp>) -> Result<()> {
        let mut batch = sled::Batch::default();
        for op in operations {
            match op {
                BatchOp::Insert { key, value } => batch.insert(key, value),
                BatchOp::Remove { key } => batch.remove(key),
            }
        }
        self.db.apply_batch(batch)?;
        Ok(())
    }

    /// Take the block-creation lock.
    ///
    /// Sealing and deposits allocate block numbers and claim pending
    /// transactions; both run while holding this guard so two of them never
    /// interleave. Slot record rewrites take it too.
    pub fn exclusive(&self) -> Result<MutexGuard<'_, ()>> {
        self.exclusive.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    // =========================================================================
    // Key Construction Helpers
    // =========================================================================

    /// Format: "slot:" + slot index key
    pub fn slot_key(slot: &Uint) -> Vec<u8> {
        prefixed(SLOT_PREFIX, &[&slot.index_key()])
    }

    /// Format: "tx:" + hash_bytes
    pub fn transaction_key(hash: &Hash) -> Vec<u8> {
        prefixed(TX_PREFIX, &[hash.as_ref()])
    }

    /// Format: "pending:" + 8-byte big-endian id
    pub fn pending_key(id: u64) -> Vec<u8> {
        prefixed(PENDING_PREFIX, &[&id.to_be_bytes()])
    }

    /// Format: "mined:" + slot index key
    pub fn mined_prefix(slot: &Uint) -> Vec<u8> {
        prefixed(MINED_PREFIX, &[&slot.index_key()])
    }

    /// Format: "mined:" + slot index key + block index key
    pub fn mined_key(slot: &Uint, block_number: &Uint) -> Vec<u8> {
        prefixed(MINED_PREFIX, &[&slot.index_key(), &block_number.index_key()])
    }

    /// Format: "block:" + block index key
    pub fn block_key(block_number: &Uint) -> Vec<u8> {
        prefixed(BLOCK_PREFIX, &[&block_number.index_key()])
    }
}

fn prefixed(prefix: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut key = prefix.to_vec();
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

/// Batch operation for atomic updates.
pub enum BatchOp {
    Insert { key: Vec<u8>, value: Vec<u8> },
    Remove { key: Vec<u8> },
}

impl BatchOp {
    /// Insert of a bincode-encoded value.
    pub fn put<V: serde::Serialize>(key: Vec<u8>, value: &V) -> Result<Self> {
        Ok(BatchOp::Insert {
            key,
            value: bincode::serialize(value)?,
        })
    }

    pub fn remove(key: Vec<u8>) -> Self {
        BatchOp::Remove { key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_temporary() {
        let storage = Storage::open_temporary().unwrap();
        assert!(storage.db.is_empty());
    }

    #[test]
    fn test_put_get() {
        let storage = Storage::open_temporary().unwrap();

        storage.put("key1", &42u64).unwrap();
        let value: Option<u64> = storage.get("key1").unwrap();
        assert_eq!(value, Some(42));

        let missing: Option<u64> = storage.get("missing").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_batch_operations() {
        let storage = Storage::open_temporary().unwrap();
        storage.put("gone", &0u64).unwrap();

        let ops = vec![
            BatchOp::put(b"a".to_vec(), &1u64).unwrap(),
            BatchOp::put(b"b".to_vec(), &2u64).unwrap(),
            BatchOp::remove(b"gone".to_vec()),
        ];
        storage.batch(ops).unwrap();

        let a: u64 = storage.get("a").unwrap().unwrap();
        let b: u64 = storage.get("b").unwrap().unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert!(!storage.contains("gone").unwrap());
    }

    #[test]
    fn test_next_id_is_increasing() {
        let storage = Storage::open_temporary().unwrap();
        let a = storage.next_id().unwrap();
        let b = storage.next_id().unwrap();
        assert!(b > a);
        assert!(Storage::pending_key(a) < Storage::pending_key(b));
    }

    #[test]
    fn test_block_keys_sort_numerically() {
        let nine = Storage::block_key(&Uint::from(9u64));
        let ten = Storage::block_key(&Uint::from(10u64));
        let thousand = Storage::block_key(&Uint::from(1000u64));
        assert!(nine < ten && ten < thousand);
    }

    #[test]
    fn test_mined_keys_grouped_by_slot() {
        let slot = Uint::from(1u64);
        let other = Uint::from(256u64);
        let prefix = Storage::mined_prefix(&slot);
        assert!(Storage::mined_key(&slot, &Uint::from(5u64)).starts_with(&prefix));
        assert!(!Storage::mined_key(&other, &Uint::from(5u64)).starts_with(&prefix));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = Storage::open(dir.path()).unwrap();
            storage.put("persisted", &7u64).unwrap();
            storage.flush().unwrap();
        }
        let storage = Storage::open(dir.path()).unwrap();
        let value: Option<u64> = storage.get("persisted").unwrap();
        assert_eq!(value, Some(7));
    }
}
