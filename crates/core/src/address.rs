//! Address and digest identifiers
//!
//! An [`Address`] is the fixed-width identifier shared by accounts and
//! objects. It is immutable once assigned; uniqueness is enforced by the
//! storage layer, never here.
//!
//! ## Rendering
//!
//! - Output: always `0x` followed by 64 lowercase hex digits
//! - Input: optional `0x` prefix, 1 to 64 hex digits, left-padded with zeros
//!
//! A [`Digest`] is a 32-byte content hash rendered in Base58.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Width of an address in bytes
pub const ADDRESS_LENGTH: usize = 32;

/// Width of a digest in bytes
pub const DIGEST_LENGTH: usize = 32;

/// Errors produced while parsing an address from user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Input was empty after stripping the `0x` prefix
    #[error("address is empty")]
    Empty,

    /// Input has more hex digits than fit in 32 bytes
    #[error("address too long: {len} hex digits (max 64)")]
    TooLong {
        /// Number of hex digits supplied
        len: usize,
    },

    /// Input contains a character that is not a hex digit
    #[error("invalid hex in address: {input}")]
    InvalidHex {
        /// The offending input
        input: String,
    },
}

/// 32-byte identifier used for both accounts and objects
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

/// Objects are addressed by the same identifier type as accounts
pub type ObjectId = Address;

impl Address {
    /// The all-zero address, used as the default dry-run sender
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    /// Create an address from raw bytes
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Address(bytes)
    }

    /// Address whose last byte is `value` (e.g. `0x1`, `0x2` framework packages)
    pub const fn from_low_byte(value: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = value;
        Address(bytes)
    }

    /// Build an address from a slice, which must be exactly 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let array: [u8; ADDRESS_LENGTH] = bytes.try_into().ok()?;
        Some(Address(array))
    }

    /// Parse a hex string, accepting an optional `0x` prefix and short forms
    pub fn from_hex(input: &str) -> Result<Self, AddressParseError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(AddressParseError::Empty);
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AddressParseError::TooLong { len: digits.len() });
        }

        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes).map_err(|_| AddressParseError::InvalidHex {
            input: input.to_string(),
        })?;
        Ok(Address(bytes))
    }

    /// Raw bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Consume into raw bytes
    #[inline]
    pub fn into_bytes(self) -> [u8; ADDRESS_LENGTH] {
        self.0
    }

    /// Canonical `0x` + 64 hex digit rendering
    pub fn to_canonical_string(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Shortest rendering that still round-trips (`0x2` rather than `0x00..02`)
    pub fn short_str_lossless(&self) -> String {
        let full = hex::encode(self.0);
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }

    /// Derive a fresh address by hashing a seed and a counter
    ///
    /// Used for synthetic objects whose identity must be stable across
    /// repeated derivations from the same inputs.
    pub fn derive(seed: &[u8], counter: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(counter.to_le_bytes());
        Address(hasher.finalize().into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short_str_lossless())
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_canonical_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Address::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <[u8; ADDRESS_LENGTH]>::deserialize(deserializer)?;
            Ok(Address(bytes))
        }
    }
}

// =============================================================================
// Digest
// =============================================================================

/// Errors produced while parsing a Base58 digest
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestParseError {
    /// Input is not valid Base58
    #[error("invalid base58 digest: {input}")]
    InvalidBase58 {
        /// The offending input
        input: String,
    },

    /// Decoded bytes are not 32 bytes long
    #[error("digest must be 32 bytes, got {len}")]
    WrongLength {
        /// Decoded length
        len: usize,
    },
}

/// 32-byte content digest (transactions, checkpoints, objects)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Digest([u8; DIGEST_LENGTH]);

impl Digest {
    /// Create a digest from raw bytes
    pub const fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Digest(bytes)
    }

    /// SHA-256 of the given bytes
    pub fn of(bytes: &[u8]) -> Self {
        Digest(Sha256::digest(bytes).into())
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    /// Base58 rendering
    pub fn base58_encode(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Parse a Base58 digest
    pub fn base58_decode(input: &str) -> Result<Self, DigestParseError> {
        let bytes = bs58::decode(input.trim())
            .into_vec()
            .map_err(|_| DigestParseError::InvalidBase58 {
                input: input.to_string(),
            })?;
        let len = bytes.len();
        let array: [u8; DIGEST_LENGTH] = bytes
            .try_into()
            .map_err(|_| DigestParseError::WrongLength { len })?;
        Ok(Digest(array))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base58_encode())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.base58_encode())
    }
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::base58_decode(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.base58_encode())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Digest::base58_decode(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <[u8; DIGEST_LENGTH]>::deserialize(deserializer)?;
            Ok(Digest(bytes))
        }
    }
}
