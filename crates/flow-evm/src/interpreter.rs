//! EVM bytecode interpreter
//!
//! One [`Interpreter`] executes one frame. Every step decodes the opcode at
//! `pc`, checks it against the active fork, validates stack depth against the
//! arity table, charges static gas and dispatches to the handler in
//! [`crate::instructions`]. Handlers move values and labels together, so the
//! value stack and the label stack never diverge.

use crate::context::CallFrame;
use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::gas::{self, cost, Gas};
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::result::{ExecutionResult, Status};
use crate::stack::DualStack;
use crate::tracer::StepRecord;
use flow_primitives::{word, TaintLabel, Word};

/// What the interpreter does after a handler returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    /// Advance to the next instruction
    Continue,
    /// Continue at the given pc
    Jump(usize),
    /// End the frame
    Halt(Status),
}

/// Execution state of a single frame
#[derive(Debug)]
pub struct Interpreter {
    pub(crate) frame: CallFrame,
    pub(crate) pc: usize,
    pub(crate) stack: DualStack,
    pub(crate) memory: Memory,
    pub(crate) gas: Gas,
    /// Output of the last sub-call
    pub(crate) return_data: Vec<u8>,
    pub(crate) return_taint: Vec<TaintLabel>,
    /// Output of this frame once it halts
    pub(crate) output: Vec<u8>,
    pub(crate) output_taint: Vec<TaintLabel>,
    pub(crate) taint_signal: TaintLabel,
    pub(crate) branch_signal: TaintLabel,
}

impl Interpreter {
    /// Create an interpreter for `frame` with fresh buffers
    pub fn new(frame: CallFrame) -> Self {
        Self::with_buffers(frame, DualStack::new(), Memory::new())
    }

    /// Create an interpreter reusing cleared buffers
    pub fn with_buffers(frame: CallFrame, stack: DualStack, memory: Memory) -> Self {
        let gas = Gas::new(frame.context.gas);
        Self {
            frame,
            pc: 0,
            stack,
            memory,
            gas,
            return_data: Vec::new(),
            return_taint: Vec::new(),
            output: Vec::new(),
            output_taint: Vec::new(),
            taint_signal: TaintLabel::SAFE,
            branch_signal: TaintLabel::SAFE,
        }
    }

    /// Give the stack and memory back for reuse
    pub fn into_buffers(self) -> (DualStack, Memory) {
        (self.stack, self.memory)
    }

    /// Program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Paired value and label stacks
    pub fn stack(&self) -> &DualStack {
        &self.stack
    }

    /// Memory and its labels
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Gas still available
    pub fn gas_remaining(&self) -> u64 {
        self.gas.remaining()
    }

    /// Execute until the frame halts or faults
    pub fn run(&mut self, evm: &mut Evm<'_>) -> ExecutionResult {
        loop {
            match self.step(evm) {
                Ok(Control::Continue) => self.pc += 1,
                Ok(Control::Jump(dest)) => self.pc = dest,
                Ok(Control::Halt(status)) => return self.finish(status),
                Err(e) => {
                    tracing::trace!("Fault at pc={}: {}", self.pc, e);
                    return ExecutionResult::failure(e, self.gas.limit(), self.gas.remaining())
                        .with_signals(self.taint_signal, self.branch_signal);
                }
            }
        }
    }

    fn finish(&mut self, status: Status) -> ExecutionResult {
        let output = std::mem::take(&mut self.output);
        let output_taint = std::mem::take(&mut self.output_taint);
        let result = match status {
            Status::Reverted => ExecutionResult::revert(
                self.gas.limit(),
                self.gas.remaining(),
                output,
                output_taint,
            ),
            _ => ExecutionResult::success(
                status,
                self.gas.limit(),
                self.gas.remaining(),
                output,
                output_taint,
            ),
        };
        result.with_signals(self.taint_signal, self.branch_signal)
    }

    /// Execute a single instruction
    pub(crate) fn step(&mut self, evm: &mut Evm<'_>) -> EvmResult<Control> {
        let Some(&byte) = self.frame.code.get(self.pc) else {
            return Ok(Control::Halt(Status::Stopped));
        };

        let rules = evm.config.rules;
        let opcode = Opcode::from_byte(byte)
            .filter(|op| op.is_active(&rules))
            .ok_or(EvmError::InvalidOpcode(byte))?;

        let info = opcode.info();
        self.stack.require(info.inputs)?;
        if self.stack.len() - info.inputs + info.outputs > cost::MAX_STACK_SIZE {
            return Err(EvmError::StackOverflow);
        }

        if self.frame.context.is_static && opcode.is_state_mutating() {
            return Err(EvmError::WriteProtection);
        }

        let static_gas = evm.schedule.cost(opcode, &rules);
        if let Some(tracer) = evm.tracer.as_mut() {
            tracer.step(&StepRecord {
                pc: self.pc,
                op: byte,
                op_name: opcode.name(),
                gas: self.gas.remaining(),
                gas_cost: static_gas,
                depth: self.frame.context.depth,
                stack: self.stack.len(),
                mem_size: self.memory.len(),
                taint: self.stack.peek().map(|(_, l)| l.bits()).unwrap_or(0),
            });
        }
        self.gas.charge(static_gas)?;

        self.execute(opcode, evm)
    }

    /// Charge for and perform memory growth covering `[offset, offset + size)`.
    ///
    /// Returns the range as `usize`; a zero size touches nothing and yields
    /// offset 0 whatever the operand was.
    pub(crate) fn expand_memory(&mut self, offset: Word, size: Word) -> EvmResult<(usize, usize)> {
        if size.is_zero() {
            return Ok((0, 0));
        }
        let offset = word::to_usize(offset).ok_or(EvmError::OutOfGas)?;
        let size = word::to_usize(size).ok_or(EvmError::OutOfGas)?;
        let new_size = Memory::required_size(offset, size).ok_or(EvmError::OutOfGas)?;
        if new_size as u64 > cost::MAX_MEMORY_SIZE {
            return Err(EvmError::OutOfGas);
        }
        if new_size > self.memory.len() {
            self.gas.charge(gas::memory_gas(self.memory.len(), new_size))?;
            self.memory.resize(new_size);
        }
        Ok((offset, size))
    }

    /// Record the OR of an exit point's labels in the frame signal
    pub(crate) fn signal_exit(&mut self, labels: &[TaintLabel]) {
        self.taint_signal |= TaintLabel::join_all(labels);
    }

    /// Fold a finished sub-frame's signals into this frame's
    pub(crate) fn absorb_signals(&mut self, child: &ExecutionResult) {
        self.taint_signal |= child.taint_signal;
        self.branch_signal |= child.branch_signal;
    }
}
