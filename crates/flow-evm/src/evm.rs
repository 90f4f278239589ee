//! Call engine
//!
//! [`Evm`] owns the collaborators of an execution and runs frames. Nested
//! CALL and CREATE re-enter it recursively; every frame gets its own stack
//! and memory from the [`FramePool`], and its state changes are rolled back
//! through the store's snapshots when it does not succeed.

use crate::config::EvmConfig;
use crate::context::{BlockContext, CallContext, CallFrame, TxContext};
use crate::error::EvmError;
use crate::gas::{cost, GasSchedule, StandardSchedule};
use crate::interpreter::Interpreter;
use crate::jumpdest::{JumpDestCache, JumpDestOracle};
use crate::pool::FramePool;
use crate::result::{ExecutionResult, Status};
use crate::sink::{NoopSink, TelemetryEvent, TelemetrySink};
use crate::state::StateStore;
use crate::tracer::Tracer;
use bytes::Bytes;
use flow_primitives::{Address, TaintLabel, Word};
use std::sync::Arc;

/// Interpreter entry point and collaborator bundle
pub struct Evm<'a> {
    pub(crate) state: &'a mut dyn StateStore,
    pub(crate) block: BlockContext,
    pub(crate) tx: TxContext,
    pub(crate) config: EvmConfig,
    pub(crate) schedule: Arc<dyn GasSchedule>,
    pub(crate) jumpdests: Arc<dyn JumpDestOracle>,
    pub(crate) sink: Arc<dyn TelemetrySink>,
    pub(crate) tracer: Option<Box<dyn Tracer + 'a>>,
    pool: FramePool,
}

impl<'a> Evm<'a> {
    /// Create an interpreter over `state` with default collaborators
    pub fn new(state: &'a mut dyn StateStore) -> Self {
        Self {
            state,
            block: BlockContext::default(),
            tx: TxContext::default(),
            config: EvmConfig::default(),
            schedule: Arc::new(StandardSchedule),
            jumpdests: Arc::new(JumpDestCache::new()),
            sink: Arc::new(NoopSink),
            tracer: None,
            pool: FramePool::new(),
        }
    }

    /// Set the configuration
    pub fn with_config(mut self, config: EvmConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the block environment
    pub fn with_block(mut self, block: BlockContext) -> Self {
        self.block = block;
        self
    }

    /// Set the transaction environment
    pub fn with_tx(mut self, tx: TxContext) -> Self {
        self.tx = tx;
        self
    }

    /// Set the gas schedule
    pub fn with_schedule(mut self, schedule: Arc<dyn GasSchedule>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set the jump destination oracle
    pub fn with_jumpdest_oracle(mut self, oracle: Arc<dyn JumpDestOracle>) -> Self {
        self.jumpdests = oracle;
        self
    }

    /// Set the telemetry sink
    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Attach a step tracer
    pub fn with_tracer(mut self, tracer: Box<dyn Tracer + 'a>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    /// Buffers currently held for reuse
    pub fn pooled_buffers(&self) -> (usize, usize) {
        self.pool.retained()
    }

    /// Execute a top-level message call
    pub fn call(&mut self, ctx: CallContext) -> ExecutionResult {
        tracing::debug!(
            "Call to {} from {} value={} gas={}",
            ctx.address,
            ctx.caller,
            ctx.value,
            ctx.gas
        );
        let result = self.message_call(ctx, true);
        self.finish_trace(&result);
        result
    }

    /// Deploy `init_code` from `caller`, returning the new address on success
    pub fn deploy(
        &mut self,
        caller: Address,
        value: Word,
        init_code: Bytes,
        gas: u64,
    ) -> (ExecutionResult, Option<Address>) {
        let (result, address) = self.create_contract(caller, value, init_code, gas, 0);
        self.finish_trace(&result);
        (result, address)
    }

    /// Run `frame` to completion without touching balances or snapshots
    pub fn execute_frame(&mut self, frame: CallFrame) -> ExecutionResult {
        let depth = frame.context.depth;
        tracing::debug!(
            "Enter frame depth={} address={} code_len={} gas={}",
            depth,
            frame.context.address,
            frame.code.len(),
            frame.context.gas
        );

        let stack = self.pool.acquire_stack();
        let memory = self.pool.acquire_memory();
        // Boxed to keep the native frame small across deep recursion
        let mut interpreter = Box::new(Interpreter::with_buffers(frame, stack, memory));
        let result = interpreter.run(self);
        let (stack, memory) = interpreter.into_buffers();
        self.pool.release(stack, memory);

        tracing::debug!(
            "Exit frame depth={} status={} gas_left={} taint={}",
            depth,
            result.status,
            result.gas_left,
            result.taint_signal
        );
        result
    }

    /// Run a call frame with value transfer and rollback on failure.
    ///
    /// With `transfer` unset the value is visible to the callee but no
    /// balance moves (DELEGATECALL).
    pub(crate) fn message_call(&mut self, ctx: CallContext, transfer: bool) -> ExecutionResult {
        let gas = ctx.gas;
        if ctx.depth > self.config.max_call_depth {
            return ExecutionResult::failure(
                EvmError::CallDepthExceeded(self.config.max_call_depth),
                gas,
                gas,
            );
        }

        let snapshot = self.state.snapshot();
        if transfer {
            if let Err(e) = self.state.transfer(&ctx.caller, &ctx.address, ctx.value) {
                self.state.revert_to(snapshot);
                return ExecutionResult::failure(e, gas, gas);
            }
        }

        let code = self.state.code(&ctx.code_address);
        let result = if code.is_empty() {
            ExecutionResult::success(Status::Stopped, gas, gas, Vec::new(), Vec::new())
        } else {
            let code_hash = self.state.code_hash(&ctx.code_address);
            self.execute_frame(CallFrame::with_hash(ctx, code, code_hash))
        };

        if result.is_success() {
            self.state.commit_snapshot(snapshot);
        } else {
            self.state.revert_to(snapshot);
        }
        result
    }

    /// Run init code and deposit the returned runtime code
    pub(crate) fn create_contract(
        &mut self,
        caller: Address,
        value: Word,
        init_code: Bytes,
        gas: u64,
        depth: usize,
    ) -> (ExecutionResult, Option<Address>) {
        if depth > self.config.max_call_depth {
            let error = EvmError::CallDepthExceeded(self.config.max_call_depth);
            return (ExecutionResult::failure(error, gas, gas), None);
        }
        if self.state.balance(&caller) < value {
            return (
                ExecutionResult::failure(EvmError::InsufficientBalance, gas, gas),
                None,
            );
        }

        let address = self.state.create_address(&caller);
        let snapshot = self.state.snapshot();
        if let Err(e) = self.state.transfer(&caller, &address, value) {
            self.state.revert_to(snapshot);
            return (ExecutionResult::failure(e, gas, gas), None);
        }
        tracing::debug!("Create {} from {} gas={}", address, caller, gas);

        let ctx = CallContext {
            address,
            code_address: address,
            caller,
            value,
            input: Bytes::new(),
            input_taint: Vec::new(),
            gas,
            is_static: false,
            depth,
        };
        let mut result = if init_code.is_empty() {
            ExecutionResult::success(Status::Stopped, gas, gas, Vec::new(), Vec::new())
        } else {
            self.execute_frame(CallFrame::new(ctx, init_code))
        };

        if result.is_success() {
            result = self.deposit_code(address, result);
        }

        if result.is_success() {
            self.state.commit_snapshot(snapshot);
            (result, Some(address))
        } else {
            self.state.revert_to(snapshot);
            (result, None)
        }
    }

    fn deposit_code(&mut self, address: Address, mut result: ExecutionResult) -> ExecutionResult {
        let rules = self.config.rules;
        let signals = (result.taint_signal, result.branch_signal);

        if rules.max_code_size_enforced() && result.output.len() > cost::MAX_CODE_SIZE {
            return ExecutionResult::failure(EvmError::MaxCodeSizeExceeded, result.gas_limit, 0)
                .with_signals(signals.0, signals.1);
        }

        let deposit = self
            .schedule
            .create_data_cost()
            .saturating_mul(result.output.len() as u64);
        if deposit <= result.gas_left {
            result.gas_left -= deposit;
            self.state
                .set_code(&address, Bytes::copy_from_slice(&result.output));
        } else if rules.code_store_failure() {
            return ExecutionResult::failure(EvmError::CodeStoreOutOfGas, result.gas_limit, 0)
                .with_signals(signals.0, signals.1);
        }
        // Frontier keeps the account without code and charges nothing
        result
    }

    pub(crate) fn notify(&self, event: TelemetryEvent) {
        self.sink.notify(&event);
    }

    pub(crate) fn notify_branch(&self, label: TaintLabel) {
        if !label.is_safe() {
            self.notify(TelemetryEvent::TaintedBranch { label });
        }
    }

    fn finish_trace(&mut self, result: &ExecutionResult) {
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.finish(result);
        }
    }
}
