//! # flow-primitives
//!
//! Primitive types shared by the flow interpreter and its tooling.
//!
//! This crate provides the 256-bit machine word and its signed helpers,
//! addresses and hashes, Keccak-256, and the [`TaintLabel`] bitmask that
//! annotates every value the interpreter produces.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
mod label;
pub mod word;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{keccak256, H256};
pub use label::{TaintLabel, MAX_PARAM_INDEX};
pub use word::Word;

// Re-export primitive-types for callers that need the wide type directly
pub use primitive_types::{U256, U512};
