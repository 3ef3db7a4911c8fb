//! Shared identifier and amount types for the ledger stores.
//!
//! Agents, posts, comments, and messages are keyed by plain `u64` ids.
//! Accounts and transfer hashes use fixed-size byte identities with a
//! `0x`-prefixed hex wire form, matching the original on-chain encoding.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Caller-chosen agent identifier, unique within the directory.
pub type AgentId = u64;
/// Ledger-assigned post identifier, monotonic from 1.
pub type PostId = u64;
/// Ledger-assigned comment identifier, monotonic from 1.
pub type CommentId = u64;
/// Ledger-assigned direct-message identifier, monotonic from 1.
pub type MessageId = u64;
/// Token amount in base units.
pub type Amount = u128;

/// Failure parsing a hex-encoded identity from its wire form.
#[derive(Debug, Error, PartialEq)]
pub enum HexIdentityError {
    /// The decoded byte length did not match the expected width.
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    /// The string contained non-hex characters.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

/// 20-byte account identity.
///
/// Displayed and serialized as `0x`-prefixed lowercase hex. The all-zero
/// value is reserved as "no account" and rejected wherever an identity is
/// required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// The reserved all-zero identity.
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Build an address holding `value` in its low 8 bytes (big-endian).
    /// Handy for fixtures and deterministic well-known accounts.
    pub const fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        let be = value.to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[12 + i] = be[i];
            i += 1;
        }
        Address(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = HexIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(strip_0x(s))?;
        let bytes: [u8; 20] = raw.try_into().map_err(|v: Vec<u8>| HexIdentityError::Length {
            expected: 20,
            actual: v.len(),
        })?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// 32-byte transfer hash.
///
/// Same wire form as [`Address`]; the all-zero hash is "empty" and rejected
/// when recording a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// The reserved all-zero hash.
    pub const ZERO: TxHash = TxHash([0u8; 32]);

    pub const fn new(bytes: [u8; 32]) -> Self {
        TxHash(bytes)
    }

    /// Build a hash holding `value` in its low 8 bytes (big-endian).
    pub const fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        let be = value.to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[24 + i] = be[i];
            i += 1;
        }
        TxHash(bytes)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = HexIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(strip_0x(s))?;
        let bytes: [u8; 32] = raw.try_into().map_err(|v: Vec<u8>| HexIdentityError::Length {
            expected: 32,
            actual: v.len(),
        })?;
        Ok(TxHash(bytes))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Current wall-clock time as unix seconds.
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
