//! Taint labels
//!
//! A [`TaintLabel`] is a bitmask describing where a value came from. Labels
//! form a join-semilattice under bitwise OR with [`TaintLabel::SAFE`] as the
//! bottom element, so combining provenance never loses information.
//!
//! Bit layout:
//!
//! | bits    | meaning                                          |
//! |---------|--------------------------------------------------|
//! | 0..=55  | derived from call-data parameter *i*             |
//! | 56      | derived from the value sent with the call        |
//! | 57      | tainted arithmetic that may overflow             |
//! | 58      | overflow-prone value checked by a branch         |
//! | 59      | tainted arithmetic that did overflow             |

use crate::word::Word;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Highest parameter index with its own bit; later parameters share it
pub const MAX_PARAM_INDEX: usize = 55;

const PARAM_MASK: u64 = (1 << (MAX_PARAM_INDEX + 1)) - 1;

/// Provenance bitmask attached to every stack word and memory byte
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaintLabel(u64);

impl TaintLabel {
    /// No taint
    pub const SAFE: TaintLabel = TaintLabel(0);

    /// Derived from the call value
    pub const VALUE: TaintLabel = TaintLabel(1 << 56);

    /// Tainted arithmetic that may overflow for some input
    pub const POTENTIAL_OVERFLOW: TaintLabel = TaintLabel(1 << 57);

    /// An overflow-prone value reached a conditional branch
    pub const PROTECTED_OVERFLOW: TaintLabel = TaintLabel(1 << 58);

    /// Tainted arithmetic wrapped around on this execution
    pub const OVERFLOW: TaintLabel = TaintLabel(1 << 59);

    /// Bits that originate from transaction inputs
    pub const INPUT_MASK: TaintLabel = TaintLabel(PARAM_MASK | (1 << 56));

    /// Bits that describe arithmetic overflow
    pub const OVERFLOW_MASK: TaintLabel = TaintLabel((1 << 57) | (1 << 58) | (1 << 59));

    /// Create from raw bits
    pub const fn from_bits(bits: u64) -> Self {
        TaintLabel(bits)
    }

    /// Raw bits
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Label for call-data parameter `index`
    pub fn param(index: usize) -> Self {
        TaintLabel(1 << index.min(MAX_PARAM_INDEX))
    }

    /// Label for a call-data read starting at `offset`.
    ///
    /// The four selector bytes at offset 0 carry no taint. Any other offset
    /// maps to parameter `(offset - 4) / 32`, truncating toward zero, so
    /// offsets 1..=35 all belong to parameter 0.
    pub fn from_calldata_offset(offset: Word) -> Self {
        if offset.is_zero() {
            return Self::SAFE;
        }
        if offset.bits() > 64 {
            return Self::param(MAX_PARAM_INDEX);
        }
        let index = offset.low_u64().saturating_sub(4) / 32;
        Self::param(usize::try_from(index).unwrap_or(MAX_PARAM_INDEX))
    }

    /// Whether the label carries no taint
    pub const fn is_safe(&self) -> bool {
        self.0 == 0
    }

    /// Whether every bit of `other` is set in `self`
    pub const fn contains(&self, other: TaintLabel) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set in `self`
    pub const fn intersects(&self, other: TaintLabel) -> bool {
        self.0 & other.0 != 0
    }

    /// Least upper bound of two labels
    pub const fn union(self, other: TaintLabel) -> TaintLabel {
        TaintLabel(self.0 | other.0)
    }

    /// Whether the label carries input provenance (parameters or value)
    pub const fn is_input_derived(&self) -> bool {
        self.intersects(Self::INPUT_MASK)
    }

    /// Whether parameter `index` flows into this label
    pub fn has_param(&self, index: usize) -> bool {
        self.contains(Self::param(index))
    }

    /// Indices of all parameters flowing into this label
    pub fn params(&self) -> impl Iterator<Item = usize> + '_ {
        (0..=MAX_PARAM_INDEX).filter(move |i| self.has_param(*i))
    }

    /// OR-reduce a sequence of labels
    pub fn join_all<'a, I>(labels: I) -> TaintLabel
    where
        I: IntoIterator<Item = &'a TaintLabel>,
    {
        labels.into_iter().fold(Self::SAFE, |acc, l| acc | *l)
    }
}

impl BitOr for TaintLabel {
    type Output = TaintLabel;

    fn bitor(self, rhs: TaintLabel) -> TaintLabel {
        self.union(rhs)
    }
}

impl BitOrAssign for TaintLabel {
    fn bitor_assign(&mut self, rhs: TaintLabel) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for TaintLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaintLabel({:#x})", self.0)
    }
}

impl fmt::Display for TaintLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_safe() {
            return write!(f, "safe");
        }
        let mut parts: Vec<String> = self.params().map(|i| format!("p{}", i)).collect();
        if self.contains(Self::VALUE) {
            parts.push("value".to_string());
        }
        if self.contains(Self::POTENTIAL_OVERFLOW) {
            parts.push("potential-overflow".to_string());
        }
        if self.contains(Self::PROTECTED_OVERFLOW) {
            parts.push("protected-overflow".to_string());
        }
        if self.contains(Self::OVERFLOW) {
            parts.push("overflow".to_string());
        }
        write!(f, "{}", parts.join("|"))
    }
}
