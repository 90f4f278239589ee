//! EVM error types

use thiserror::Error;

/// Faults that abort a frame
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Out of gas
    #[error("out of gas")]
    OutOfGas,

    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (max 1024)")]
    StackOverflow,

    /// Jump target is not a JUMPDEST
    #[error("invalid jump destination: {0}")]
    InvalidJumpDestination(usize),

    /// Undefined or inactive opcode
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// State modification in a static frame
    #[error("write protection")]
    WriteProtection,

    /// Deployed code over the EIP-170 limit
    #[error("max code size exceeded (limit: 24576 bytes)")]
    MaxCodeSizeExceeded,

    /// Not enough gas left to store created code
    #[error("contract creation code storage out of gas")]
    CodeStoreOutOfGas,

    /// RETURNDATACOPY past the end of the return buffer
    #[error("return data out of bounds")]
    ReturnDataOutOfBounds,

    /// REVERT executed
    #[error("execution reverted")]
    ExecutionReverted,

    /// Nested call deeper than the configured limit
    #[error("call depth exceeded (max {0})")]
    CallDepthExceeded(usize),

    /// Value transfer larger than the sender's balance
    #[error("insufficient balance for transfer")]
    InsufficientBalance,
}

impl EvmError {
    /// Whether the fault leaves the frame's remaining gas untouched
    pub fn preserves_gas(&self) -> bool {
        matches!(
            self,
            EvmError::ExecutionReverted
                | EvmError::CallDepthExceeded(_)
                | EvmError::InsufficientBalance
        )
    }
}

/// Result type for EVM operations
pub type EvmResult<T> = Result<T, EvmError>;
