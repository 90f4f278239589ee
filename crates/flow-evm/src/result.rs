//! Frame outcomes and the overflow verdict

use crate::error::EvmError;
use flow_primitives::{Address, TaintLabel, H256};
use serde::Serialize;
use std::fmt;

/// Terminal state of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// STOP, SELFDESTRUCT or end of code
    Stopped,
    /// RETURN
    Returned,
    /// REVERT
    Reverted,
    /// Any other fault
    Faulted,
}

impl Status {
    /// Whether the frame's state changes are kept
    pub fn is_success(self) -> bool {
        matches!(self, Status::Stopped | Status::Returned)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Stopped => "stopped",
            Status::Returned => "returned",
            Status::Reverted => "reverted",
            Status::Faulted => "faulted",
        };
        f.write_str(s)
    }
}

/// Outcome of a frame, including the taint that escaped it
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Terminal state
    pub status: Status,
    /// Fault that ended the frame, if any
    pub error: Option<EvmError>,
    /// Gas given to the frame
    pub gas_limit: u64,
    /// Gas not consumed
    pub gas_left: u64,
    /// Return or revert data
    pub output: Vec<u8>,
    /// Label of each output byte
    pub output_taint: Vec<TaintLabel>,
    /// OR of all taint returned or reverted anywhere in the call tree
    pub taint_signal: TaintLabel,
    /// OR of all tainted JUMPI conditions in the call tree
    pub branch_signal: TaintLabel,
}

impl ExecutionResult {
    /// Result of a frame that halted normally
    pub fn success(
        status: Status,
        gas_limit: u64,
        gas_left: u64,
        output: Vec<u8>,
        output_taint: Vec<TaintLabel>,
    ) -> Self {
        Self {
            status,
            error: None,
            gas_limit,
            gas_left,
            output,
            output_taint,
            taint_signal: TaintLabel::SAFE,
            branch_signal: TaintLabel::SAFE,
        }
    }

    /// Result of a REVERT
    pub fn revert(
        gas_limit: u64,
        gas_left: u64,
        output: Vec<u8>,
        output_taint: Vec<TaintLabel>,
    ) -> Self {
        Self {
            status: Status::Reverted,
            error: Some(EvmError::ExecutionReverted),
            ..Self::success(Status::Reverted, gas_limit, gas_left, output, output_taint)
        }
    }

    /// Result of a fault; all gas is forfeited unless the fault preserves it
    pub fn failure(error: EvmError, gas_limit: u64, gas_left: u64) -> Self {
        let gas_left = if error.preserves_gas() { gas_left } else { 0 };
        Self {
            status: Status::Faulted,
            error: Some(error),
            ..Self::success(Status::Faulted, gas_limit, gas_left, Vec::new(), Vec::new())
        }
    }

    /// Attach the accumulated signals
    pub fn with_signals(mut self, taint: TaintLabel, branch: TaintLabel) -> Self {
        self.taint_signal = taint;
        self.branch_signal = branch;
        self
    }

    /// Whether state changes are kept
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Gas consumed
    pub fn gas_used(&self) -> u64 {
        self.gas_limit - self.gas_left
    }

    /// Overflow classification of this execution
    pub fn verdict(&self) -> Verdict {
        Verdict::classify(self.taint_signal, self.branch_signal)
    }
}

/// Log entry emitted by LOG opcodes; labels are not recorded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics (0-4)
    pub topics: Vec<H256>,
    /// Log data
    pub data: Vec<u8>,
}

/// Overflow classification derived from the escaped taint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Verdict {
    /// No tainted arithmetic reached an exit point
    #[serde(rename = "safe")]
    Safe,
    /// Tainted arithmetic reached an exit but did not wrap on this input
    #[serde(rename = "potential overflow")]
    PotentialOverflow,
    /// Overflow-prone arithmetic was checked by a conditional branch
    #[serde(rename = "protected overflow")]
    ProtectedOverflow,
    /// Tainted arithmetic wrapped and reached an exit
    #[serde(rename = "overflow")]
    Overflow,
}

impl Verdict {
    /// Classify from the return signal and the branch signal
    pub fn classify(taint: TaintLabel, branch: TaintLabel) -> Self {
        if taint.contains(TaintLabel::OVERFLOW) {
            Verdict::Overflow
        } else if branch.contains(TaintLabel::PROTECTED_OVERFLOW) {
            Verdict::ProtectedOverflow
        } else if taint.contains(TaintLabel::POTENTIAL_OVERFLOW) {
            Verdict::PotentialOverflow
        } else {
            Verdict::Safe
        }
    }

    /// Text form printed after `taint:`
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::PotentialOverflow => "potential overflow",
            Verdict::ProtectedOverflow => "protected overflow",
            Verdict::Overflow => "overflow",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
