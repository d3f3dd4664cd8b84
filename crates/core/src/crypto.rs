//! secp256k1 signing and signer recovery with Ethereum-style addresses.

use crate::hash::{hash, Hash};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// A 20-byte address derived from the public key hash.
pub type AddressBytes = [u8; 20];

/// Length of a recoverable signature: `r ‖ s ‖ v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// An address on the chain.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub AddressBytes);

impl Address {
    /// The zero address (all zeros).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: AddressBytes) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &AddressBytes {
        &self.0
    }

    /// Convert to a lowercase hex string (with 0x prefix).
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from a hex string (with or without 0x prefix, any letter case).
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidAddress)?;
        if bytes.len() != 20 {
            return Err(CryptoError::InvalidAddress);
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derive the address of a secp256k1 public key:
    /// the last 20 bytes of `keccak256(x ‖ y)`.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let digest = hash(&point.as_bytes()[1..]);
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&digest.0[12..]);
        Self(addr)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A recoverable ECDSA signature, `r ‖ s ‖ v`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Create a signature from raw bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Convert to a lowercase hex string (without prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string (with or without 0x prefix, any letter case).
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidSignature)?;
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignatureLength(bytes.len()));
        }
        let mut arr = [0u8; SIGNATURE_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The recovery byte `v`.
    pub fn v(&self) -> u8 {
        self.0[64]
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid signature encoding")]
    InvalidSignature,
    #[error("signature must be 65 bytes, got {0}")]
    InvalidSignatureLength(usize),
    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),
    #[error("invalid signature scalars")]
    InvalidScalars,
    #[error("public key recovery failed")]
    RecoveryFailed,
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("invalid address format")]
    InvalidAddress,
    #[error("signing failed")]
    SigningFailed,
}

/// Recover the address that signed `hash`.
///
/// Every malformed input is reported as a [`CryptoError`]; this never panics.
pub fn recover(hash: &Hash, signature: &Signature) -> Result<Address, CryptoError> {
    let recovery_id = parse_recovery_id(signature.v())?;
    let sig = EcdsaSignature::from_slice(&signature.0[..64])
        .map_err(|_| CryptoError::InvalidScalars)?;
    let key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(Address::from_verifying_key(&key))
}

/// Accepts `v` as 0/1 or the Ethereum legacy 27/28.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, CryptoError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(CryptoError::InvalidRecoveryId(v)),
    };
    RecoveryId::from_byte(id).ok_or(CryptoError::InvalidRecoveryId(v))
}

/// A secp256k1 keypair.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a keypair from a 32-byte private key.
    pub fn from_private_key(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create a keypair from a hex private key (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| CryptoError::InvalidPrivateKey)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_private_key(&bytes)
    }

    /// Get the private key bytes.
    pub fn private_key(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    /// Get the address derived from the public key.
    pub fn address(&self) -> Address {
        Address::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte hash directly (no message prefix). `v` is 27 or 28.
    pub fn sign_hash(&self, hash: &Hash) -> Result<Signature, CryptoError> {
        let (sig, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(hash.as_bytes())
            .map_err(|_| CryptoError::SigningFailed)?;
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(Signature(out))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let kp = Keypair::generate();
        assert_ne!(kp.address(), Address::ZERO);
    }

    #[test]
    fn test_sign_and_recover() {
        let kp = Keypair::generate();
        let message = hash(b"hello world");
        let sig = kp.sign_hash(&message).unwrap();
        assert!(sig.v() == 27 || sig.v() == 28);
        assert_eq!(recover(&message, &sig).unwrap(), kp.address());
    }

    #[test]
    fn test_recover_accepts_zero_based_v() {
        let kp = Keypair::generate();
        let message = hash(b"zero based");
        let mut sig = kp.sign_hash(&message).unwrap();
        sig.0[64] -= 27;
        assert_eq!(recover(&message, &sig).unwrap(), kp.address());
    }

    #[test]
    fn test_wrong_message_recovers_other_address() {
        let kp = Keypair::generate();
        let sig = kp.sign_hash(&hash(b"hello")).unwrap();
        let recovered = recover(&hash(b"world"), &sig);
        assert_ne!(recovered, Ok(kp.address()));
    }

    #[test]
    fn test_malformed_signatures_are_errors() {
        let message = hash(b"malformed");

        let zeroes = Signature([0u8; SIGNATURE_LENGTH]);
        assert_eq!(recover(&message, &zeroes), Err(CryptoError::InvalidScalars));

        let mut bad_v = Keypair::generate().sign_hash(&message).unwrap();
        bad_v.0[64] = 5;
        assert_eq!(recover(&message, &bad_v), Err(CryptoError::InvalidRecoveryId(5)));

        assert_eq!(
            Signature::from_hex("0x1234"),
            Err(CryptoError::InvalidSignatureLength(2))
        );
        assert_eq!(Signature::from_hex("zz"), Err(CryptoError::InvalidSignature));
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Keypair::generate().address();
        let parsed = Address::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn test_address_from_hex_mixed_case() {
        let addr = Address::from_hex("0xf62c9Df4c6eC38b9232831548d354BB6A67985eD").unwrap();
        assert_eq!(addr.to_hex(), "0xf62c9df4c6ec38b9232831548d354bb6a67985ed");
        assert!(Address::from_hex("0x1234").is_err());
    }

    #[test]
    fn test_known_private_key_address() {
        let kp = Keypair::from_hex(
            "0x379717fa635d3f8b6f6e2ba65440600ed28812ef34edede5420a1befe4d0979d",
        )
        .unwrap();
        assert_eq!(
            kp.address().to_hex(),
            "0x6893ad12e1fcd46ab2df0de632d54eef82fac13e"
        );
    }

    #[test]
    fn test_keypair_from_private_key() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::from_private_key(&kp1.private_key()).unwrap();
        assert_eq!(kp1.address(), kp2.address());
        assert!(Keypair::from_private_key(&[0u8; 32]).is_err());
    }
}
