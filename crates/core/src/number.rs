//! Arbitrary-precision unsigned integers for slots and block numbers.
//!
//! Slots, block numbers and `blockSpent` all share this one representation so
//! that no value is ever routed through a fixed-width machine integer. On the
//! wire and in JSON they are decimal strings.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a [`Uint`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("empty number")]
    Empty,
    #[error("invalid decimal digit in {0:?}")]
    InvalidDigit(String),
}

/// A non-negative integer of unbounded size.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uint(BigUint);

impl Uint {
    /// Zero.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Parse a decimal string. Surrounding whitespace is ignored; signs,
    /// fractions, exponents and hex are rejected.
    pub fn parse_decimal(s: &str) -> Result<Self, NumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NumberError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NumberError::InvalidDigit(s.to_string()));
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| NumberError::InvalidDigit(s.to_string()))
    }

    /// Check whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Minimal big-endian magnitude (empty for zero).
    pub fn to_be_bytes(&self) -> Vec<u8> {
        if self.is_zero() {
            Vec::new()
        } else {
            self.0.to_bytes_be()
        }
    }

    /// Big-endian bytes left-padded to `width`, or `None` if the value is wider.
    pub fn to_be_padded(&self, width: usize) -> Option<Vec<u8>> {
        let bytes = self.to_be_bytes();
        if bytes.len() > width {
            return None;
        }
        let mut out = vec![0u8; width - bytes.len()];
        out.extend_from_slice(&bytes);
        Some(out)
    }

    /// Order-preserving key: 4-byte big-endian length followed by the minimal
    /// magnitude. Byte-wise comparison of two keys matches numeric comparison
    /// of the values, and no key is a prefix of another.
    pub fn index_key(&self) -> Vec<u8> {
        let bytes = self.to_be_bytes();
        let mut key = Vec::with_capacity(4 + bytes.len());
        key.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        key.extend_from_slice(&bytes);
        key
    }

    /// Inverse of [`Uint::index_key`]. Returns `None` for malformed keys.
    pub fn from_index_key(key: &[u8]) -> Option<Self> {
        if key.len() < 4 {
            return None;
        }
        let (len, rest) = key.split_at(4);
        let len = u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize;
        if rest.len() != len {
            return None;
        }
        Some(Self(BigUint::from_bytes_be(rest)))
    }

    /// Smallest multiple of `step` strictly greater than `self`.
    ///
    /// A zero step yields `self + 1`.
    pub fn next_multiple_of(&self, step: &Uint) -> Uint {
        if step.is_zero() {
            return Self(&self.0 + 1u32);
        }
        Self((&self.0 / &step.0 + 1u32) * &step.0)
    }
}

impl From<u64> for Uint {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Uint {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl FromStr for Uint {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s)
    }
}

impl fmt::Display for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uint({})", self.0)
    }
}

impl Serialize for Uint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Uint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Uint::parse_decimal(&s).map_err(serde::de::Error::custom)
    }
}
