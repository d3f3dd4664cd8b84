//! Keccak-256 hashing utilities for the child chain.

use crate::crypto::Address;
use crate::number::Uint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;

/// A named alias for a 32-byte(u8) array, used to represent a 256-bit hash.
pub type H256 = [u8; 32];

/// Byte width of a slot in the hashed encoding (uint64).
pub const SLOT_WIDTH: usize = 8;

/// Byte width of block numbers and denominations in the hashed encoding (uint256).
pub const WORD_WIDTH: usize = 32;

/// Denomination carried by every transfer. Slots are single-denomination.
pub const DENOMINATION: u64 = 1;

/// A wrapper type for H256 with Display and Debug formatting.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash(pub H256);

impl Hash {
    /// The zero hash (all zeros).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a new Hash from raw bytes.
    pub fn from_bytes(bytes: H256) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &H256 {
        &self.0
    }

    /// Convert to a lowercase hex string (without prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string, with or without `0x` prefix, in either case.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(0x{})", &self.to_hex()[..8])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl From<H256> for Hash {
    fn from(bytes: H256) -> Self {
        Self(bytes)
    }
}

impl From<Hash> for H256 {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Hash arbitrary data using Keccak-256.
pub fn hash(data: &[u8]) -> Hash {
    hash_concat(&[data])
}

/// Hash multiple pieces of data by concatenating them.
pub fn hash_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Hash(out)
}

/// Content hash of a transfer: `keccak256(slot ‖ block_spent ‖ denomination ‖ recipient)`.
///
/// The slot is encoded as 8 big-endian bytes, block_spent and the denomination as
/// 32 big-endian bytes each. Returns `None` when a value does not fit its width.
pub fn transaction_hash(
    slot: &Uint,
    block_spent: &Uint,
    denomination: &Uint,
    recipient: &Address,
) -> Option<Hash> {
    let slot = slot.to_be_padded(SLOT_WIDTH)?;
    let block_spent = block_spent.to_be_padded(WORD_WIDTH)?;
    let denomination = denomination.to_be_padded(WORD_WIDTH)?;
    Some(hash_concat(&[
        &slot,
        &block_spent,
        &denomination,
        recipient.as_ref(),
    ]))
}

/// Merkle leaf for a slot: `keccak256(slot as 8 big-endian bytes)`.
pub fn slot_leaf(slot: &Uint) -> Option<Hash> {
    slot.to_be_padded(SLOT_WIDTH).map(|bytes| hash(&bytes))
}
