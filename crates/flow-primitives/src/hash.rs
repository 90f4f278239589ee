//! 32-byte hash type and Keccak-256

use crate::word::{self, Word};
use sha3::{Digest, Keccak256};
use std::fmt;

/// 32-byte value used for code hashes, block hashes and log topics
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct H256([u8; 32]);

impl H256 {
    /// All-zero hash
    pub const ZERO: H256 = H256([0; 32]);

    /// Wrap raw bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }

    /// Big-endian bytes of a word
    pub fn from_word(value: Word) -> Self {
        H256(word::to_bytes(value))
    }

    /// Interpret as a big-endian word
    pub fn to_word(&self) -> Word {
        Word::from_big_endian(&self.0)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self)
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Keccak-256 digest of `data`
pub fn keccak256(data: &[u8]) -> H256 {
    H256(Keccak256::digest(data).into())
}
