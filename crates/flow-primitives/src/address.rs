//! 20-byte account address

use crate::word::{self, Word};
use std::fmt;
use thiserror::Error;

/// Address parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Not valid hex
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Decoded to the wrong number of bytes
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// Account address, the low 160 bits of a stack word
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// All-zero address
    pub const ZERO: Address = Address([0; 20]);

    /// Wrap raw bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Parse `0x`-prefixed or bare hex
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let len = decoded.len();
        decoded
            .try_into()
            .map(Address)
            .map_err(|_| AddressError::InvalidLength(len))
    }

    /// Truncate a stack word to its low 160 bits
    pub fn from_word(value: Word) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word::to_bytes(value)[12..]);
        Address(bytes)
    }

    /// Widen to a stack word (left-padded with zeros)
    pub fn to_word(&self) -> Word {
        Word::from_big_endian(&self.0)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether every byte is zero
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// `0x`-prefixed lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(feature = "rlp")]
impl rlp::Encodable for Address {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.encoder().encode_value(&self.0);
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
