//! Common error types for primitives

use crate::address::AddressError;
use thiserror::Error;

/// Primitive operation error
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Word parsing error
    #[error("invalid word: {0}")]
    Word(String),
}
