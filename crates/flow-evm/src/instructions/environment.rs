//! Environment: ADDRESS, BALANCE, ORIGIN, CALLER, CALLVALUE, CALLDATALOAD,
//! CALLDATASIZE, CALLDATACOPY, CODESIZE, CODECOPY, GASPRICE, EXTCODESIZE,
//! EXTCODECOPY, RETURNDATASIZE, RETURNDATACOPY
//!
//! Call data is where taint enters a transaction. A read at offset `o > 0`
//! is labelled with parameter `(o - 4) / 32`, joined with whatever labels
//! the caller attached to those bytes.

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::gas;
use crate::interpreter::{Control, Interpreter};
use flow_primitives::{word, Address, TaintLabel, Word};

/// `size` items of `src` starting at `offset`, padded with defaults past the end
fn padded_copy<T: Copy + Default>(src: &[T], offset: Word, size: usize) -> Vec<T> {
    let mut out = vec![T::default(); size];
    if let Some(start) = word::to_usize(offset) {
        if start < src.len() {
            let end = start.saturating_add(size).min(src.len());
            out[..end - start].copy_from_slice(&src[start..end]);
        }
    }
    out
}

impl Interpreter {
    fn push_address(&mut self, address: Address) -> EvmResult<Control> {
        self.stack.push_safe(address.to_word())?;
        Ok(Control::Continue)
    }

    fn push_safe_u64(&mut self, value: u64) -> EvmResult<Control> {
        self.stack.push_safe(Word::from(value))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_address(&mut self) -> EvmResult<Control> {
        self.push_address(self.frame.context.address)
    }

    pub(super) fn op_balance(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let (address, label) = self.stack.pop()?;
        let balance = evm.state.balance(&Address::from_word(address));
        self.stack.push(balance, label)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_origin(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        self.push_address(evm.tx.origin)
    }

    pub(super) fn op_caller(&mut self) -> EvmResult<Control> {
        self.push_address(self.frame.context.caller)
    }

    pub(super) fn op_callvalue(&mut self) -> EvmResult<Control> {
        self.stack.push(self.frame.context.value, TaintLabel::VALUE)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_calldataload(&mut self) -> EvmResult<Control> {
        let (offset, _) = self.stack.pop()?;
        let ctx = &self.frame.context;

        let bytes = padded_copy(&ctx.input, offset, 32);
        let mut label = TaintLabel::from_calldata_offset(offset);
        if let Some(start) = word::to_usize(offset) {
            label |= ctx.input_labels(start, 32);
        }

        self.stack.push(Word::from_big_endian(&bytes), label)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_calldatasize(&mut self) -> EvmResult<Control> {
        self.push_safe_u64(self.frame.context.input.len() as u64)
    }

    pub(super) fn op_calldatacopy(&mut self) -> EvmResult<Control> {
        let [(mem_offset, _), (data_offset, _), (size, _)] = self.stack.popn()?;
        let (mem_offset, size) = self.expand_memory(mem_offset, size)?;
        self.gas.charge(gas::copy_gas(size))?;
        if size == 0 {
            return Ok(Control::Continue);
        }

        let ctx = &self.frame.context;
        let positional = TaintLabel::from_calldata_offset(data_offset);
        let bytes = padded_copy(&ctx.input, data_offset, size);
        let mut labels = padded_copy(&ctx.input_taint, data_offset, size);
        for label in labels.iter_mut() {
            *label |= positional;
        }

        self.memory.set(mem_offset, &bytes, &labels);
        Ok(Control::Continue)
    }

    pub(super) fn op_codesize(&mut self) -> EvmResult<Control> {
        self.push_safe_u64(self.frame.code.len() as u64)
    }

    pub(super) fn op_codecopy(&mut self) -> EvmResult<Control> {
        let [(mem_offset, _), (code_offset, _), (size, _)] = self.stack.popn()?;
        let (mem_offset, size) = self.expand_memory(mem_offset, size)?;
        self.gas.charge(gas::copy_gas(size))?;

        let bytes = padded_copy(&self.frame.code, code_offset, size);
        self.memory.set_with_label(mem_offset, &bytes, TaintLabel::SAFE);
        Ok(Control::Continue)
    }

    pub(super) fn op_gasprice(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        self.stack.push_safe(evm.tx.gas_price)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_extcodesize(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let (address, _) = self.stack.pop()?;
        let size = evm.state.code_size(&Address::from_word(address));
        self.push_safe_u64(size as u64)
    }

    pub(super) fn op_extcodecopy(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let [(address, _), (mem_offset, _), (code_offset, _), (size, _)] = self.stack.popn()?;
        let (mem_offset, size) = self.expand_memory(mem_offset, size)?;
        self.gas.charge(gas::copy_gas(size))?;

        let code = evm.state.code(&Address::from_word(address));
        let bytes = padded_copy(&code, code_offset, size);
        self.memory.set_with_label(mem_offset, &bytes, TaintLabel::SAFE);
        Ok(Control::Continue)
    }

    pub(super) fn op_returndatasize(&mut self) -> EvmResult<Control> {
        self.push_safe_u64(self.return_data.len() as u64)
    }

    pub(super) fn op_returndatacopy(&mut self) -> EvmResult<Control> {
        let [(mem_offset, _), (data_offset, _), (size, _)] = self.stack.popn()?;

        let (end, overflow) = data_offset.overflowing_add(size);
        if overflow || end > Word::from(self.return_data.len()) {
            return Err(EvmError::ReturnDataOutOfBounds);
        }

        let (mem_offset, size) = self.expand_memory(mem_offset, size)?;
        self.gas.charge(gas::copy_gas(size))?;
        if size == 0 {
            return Ok(Control::Continue);
        }

        let start = data_offset.low_u64() as usize;
        self.memory.set(
            mem_offset,
            &self.return_data[start..start + size],
            &self.return_taint[start..start + size],
        );
        Ok(Control::Continue)
    }
}
