//! Stack, memory, storage and control flow: POP, MLOAD, MSTORE, MSTORE8,
//! SLOAD, SSTORE, JUMP, JUMPI, PC, MSIZE, GAS, PUSHn, DUPn, SWAPn
//!
//! Memory keeps one label per byte. Storage keeps none: SLOAD results carry
//! the label of the slot key only.

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::interpreter::{Control, Interpreter};
use crate::sink::TelemetryEvent;
use flow_primitives::{word, TaintLabel, Word};

impl Interpreter {
    pub(super) fn op_pop(&mut self) -> EvmResult<Control> {
        self.stack.pop()?;
        Ok(Control::Continue)
    }

    pub(super) fn op_mload(&mut self) -> EvmResult<Control> {
        let (offset, _) = self.stack.pop()?;
        let (offset, _) = self.expand_memory(offset, Word::from(32))?;
        let (value, label) = self.memory.load_word(offset);
        self.stack.push(value, label)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_mstore(&mut self) -> EvmResult<Control> {
        let [(offset, _), (value, label)] = self.stack.popn()?;
        let (offset, _) = self.expand_memory(offset, Word::from(32))?;
        self.memory.set_word(offset, value, label);
        Ok(Control::Continue)
    }

    pub(super) fn op_mstore8(&mut self) -> EvmResult<Control> {
        let [(offset, _), (value, label)] = self.stack.popn()?;
        let (offset, _) = self.expand_memory(offset, Word::one())?;
        self.memory.set_byte(offset, value.byte(0), label);
        Ok(Control::Continue)
    }

    pub(super) fn op_sload(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let (slot, label) = self.stack.pop()?;
        let address = self.frame.context.address;
        let value = evm.state.storage(&address, slot);
        evm.notify(TelemetryEvent::StorageRead { address, slot });
        self.stack.push(value, label)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_sstore(&mut self, evm: &mut Evm<'_>) -> EvmResult<Control> {
        let [(slot, _), (value, _)] = self.stack.popn()?;
        let address = self.frame.context.address;

        let current = evm.state.storage(&address, slot);
        self.gas.charge(evm.schedule.sstore_cost(current, value))?;

        evm.state.set_storage(&address, slot, value);
        evm.notify(TelemetryEvent::StorageWrite { address, slot });
        Ok(Control::Continue)
    }

    fn jump_target(&self, evm: &Evm<'_>, dest: Word) -> EvmResult<usize> {
        let dest = word::to_usize(dest).unwrap_or(usize::MAX);
        if evm
            .jumpdests
            .is_valid_jump_dest(&self.frame.code_hash, &self.frame.code, dest)
        {
            Ok(dest)
        } else {
            Err(EvmError::InvalidJumpDestination(dest))
        }
    }

    pub(super) fn op_jump(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let (dest, _) = self.stack.pop()?;
        Ok(Control::Jump(self.jump_target(evm, dest)?))
    }

    pub(super) fn op_jumpi(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let [(dest, _), (cond, label)] = self.stack.popn()?;

        self.branch_signal |= label;
        if evm.config.track_overflow
            && label.intersects(TaintLabel::POTENTIAL_OVERFLOW | TaintLabel::OVERFLOW)
        {
            self.branch_signal |= TaintLabel::PROTECTED_OVERFLOW;
        }
        evm.notify_branch(label);

        if cond.is_zero() {
            Ok(Control::Continue)
        } else {
            Ok(Control::Jump(self.jump_target(evm, dest)?))
        }
    }

    pub(super) fn op_pc(&mut self) -> EvmResult<Control> {
        self.stack.push_safe(Word::from(self.pc))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_msize(&mut self) -> EvmResult<Control> {
        self.stack.push_safe(Word::from(self.memory.len()))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_gas(&mut self) -> EvmResult<Control> {
        self.stack.push_safe(Word::from(self.gas.remaining()))?;
        Ok(Control::Continue)
    }

    /// Push the `n`-byte immediate; bytes past the end of code read as zero
    pub(super) fn op_push(&mut self, n: usize) -> EvmResult<Control> {
        let start = self.pc + 1;
        let mut immediate = vec![0u8; n];
        if start < self.frame.code.len() {
            let end = (start + n).min(self.frame.code.len());
            immediate[..end - start].copy_from_slice(&self.frame.code[start..end]);
        }
        self.stack.push_safe(Word::from_big_endian(&immediate))?;
        Ok(Control::Jump(start + n))
    }

    pub(super) fn op_dup(&mut self, n: usize) -> EvmResult<Control> {
        self.stack.dup(n)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_swap(&mut self, n: usize) -> EvmResult<Control> {
        self.stack.swap(n)?;
        Ok(Control::Continue)
    }
}
