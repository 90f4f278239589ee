//! # flow-evm
//!
//! EVM bytecode interpreter with a dynamic taint-tracking overlay.
//!
//! This crate provides:
//! - A stack machine executing EVM bytecode from Frontier to Constantinople
//! - Per-word and per-byte [`TaintLabel`]s that follow every value from
//!   call data and call value to stack, memory, sub-calls and outputs
//! - Nested CALL/CREATE frames with state rollback on failure
//! - Overflow classification of tainted arithmetic ([`Verdict`])
//! - Pluggable gas schedule, jump destination oracle, telemetry sink and
//!   step tracer
//!
//! ```no_run
//! use bytes::Bytes;
//! use flow_evm::{CallContext, Evm, InMemoryState};
//! use flow_primitives::{Address, Word};
//!
//! let mut state = InMemoryState::new();
//! let contract = Address::from_bytes([1; 20]);
//! let mut evm = Evm::new(&mut state);
//! let ctx = CallContext::new(contract, Address::ZERO, Word::zero(), Bytes::new(), 100_000);
//! let result = evm.call(ctx);
//! println!("{} {}", result.status, result.taint_signal);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod error;
pub mod evm;
pub mod gas;
mod instructions;
pub mod interpreter;
pub mod jumpdest;
pub mod memory;
pub mod opcode;
pub mod pool;
pub mod result;
pub mod sink;
pub mod stack;
pub mod state;
pub mod tracer;

pub use config::{ChainConfig, EvmConfig, Fork, Rules};
pub use context::{BlockContext, CallContext, CallFrame, TxContext};
pub use error::{EvmError, EvmResult};
pub use evm::Evm;
pub use gas::{GasSchedule, StandardSchedule};
pub use interpreter::Interpreter;
pub use jumpdest::{analyze_jump_dests, JumpDestCache, JumpDestOracle};
pub use memory::Memory;
pub use opcode::Opcode;
pub use result::{ExecutionResult, Log, Status, Verdict};
pub use sink::{ChannelSink, NoopSink, RecordingSink, TelemetryEvent, TelemetrySink, TracingSink};
pub use stack::DualStack;
pub use state::{contract_address, Account, InMemoryState, StateStore};
pub use tracer::{JsonTracer, StepRecord, Tracer};

pub use flow_primitives::TaintLabel;
