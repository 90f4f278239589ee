//! System operations: CREATE, CALL, CALLCODE, DELEGATECALL, STATICCALL,
//! RETURN, REVERT, SELFDESTRUCT
//!
//! Sub-calls receive the labels of their input bytes, so taint flows across
//! frame boundaries in both directions: into the callee through call data
//! and back through the output region and RETURNDATACOPY.

use crate::context::CallContext;
use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::gas::{self, cost};
use crate::interpreter::{Control, Interpreter};
use crate::result::{ExecutionResult, Status};
use bytes::Bytes;
use flow_primitives::{word, Address, TaintLabel, Word};

/// Flavour of a message call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CallKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

impl Interpreter {
    /// Child context for a call of `kind` to `to`
    fn child_context(
        &self,
        kind: CallKind,
        to: Address,
        value: Word,
        input: Vec<u8>,
        input_taint: Vec<TaintLabel>,
        gas: u64,
    ) -> CallContext {
        let parent = &self.frame.context;
        let (address, caller) = match kind {
            CallKind::Call | CallKind::StaticCall => (to, parent.address),
            CallKind::CallCode => (parent.address, parent.address),
            CallKind::DelegateCall => (parent.address, parent.caller),
        };
        CallContext {
            address,
            code_address: to,
            caller,
            value,
            input: Bytes::from(input),
            input_taint,
            gas,
            is_static: parent.is_static || kind == CallKind::StaticCall,
            depth: parent.depth + 1,
        }
    }

    /// Keep a finished sub-frame's output as this frame's return data
    fn set_return_data(&mut self, result: ExecutionResult) {
        self.return_data = result.output;
        self.return_taint = result.output_taint;
    }

    pub(super) fn op_call(&mut self, kind: CallKind, evm: &mut Evm<'_>) -> EvmResult<Control> {
        let [(requested, _), (to, _)] = self.stack.popn()?;
        let to = Address::from_word(to);
        let value = match kind {
            CallKind::Call | CallKind::CallCode => self.stack.pop()?.0,
            CallKind::DelegateCall => self.frame.context.value,
            CallKind::StaticCall => Word::zero(),
        };
        let [(in_offset, _), (in_size, _), (out_offset, _), (out_size, _)] = self.stack.popn()?;

        let transfers_value = matches!(kind, CallKind::Call | CallKind::CallCode) && !value.is_zero();
        if kind == CallKind::Call && transfers_value && self.frame.context.is_static {
            return Err(EvmError::WriteProtection);
        }

        let (in_offset, in_size) = self.expand_memory(in_offset, in_size)?;
        let (out_offset, out_size) = self.expand_memory(out_offset, out_size)?;

        let rules = evm.config.rules;
        let creates_account = kind == CallKind::Call
            && if rules.is_eip158 {
                evm.state.is_empty(&to)
            } else {
                !evm.state.exists(&to)
            };
        self.gas
            .charge(evm.schedule.call_cost(&rules, transfers_value, creates_account))?;

        let mut forwarded = gas::call_gas(&rules, self.gas.remaining(), requested)?;
        self.gas.charge(forwarded)?;
        if transfers_value {
            forwarded += cost::CALL_STIPEND;
        }

        let (input, input_taint) = self.memory.get(in_offset, in_size);
        let child = self.child_context(kind, to, value, input, input_taint, forwarded);
        tracing::trace!(
            "{:?} to {} depth={} gas={}",
            kind,
            to,
            child.depth,
            forwarded
        );

        let result = evm.message_call(child, kind != CallKind::DelegateCall);
        self.gas.refund(result.gas_left);
        self.absorb_signals(&result);

        if result.is_success() || result.status == Status::Reverted {
            let n = out_size.min(result.output.len());
            self.memory
                .set(out_offset, &result.output[..n], &result.output_taint[..n]);
        }

        let success = result.is_success();
        self.set_return_data(result);
        self.stack.push_safe(word::from_bool(success))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_create(&mut self, evm: &mut Evm<'_>) -> EvmResult<Control> {
        let [(value, _), (offset, _), (size, _)] = self.stack.popn()?;
        let (offset, size) = self.expand_memory(offset, size)?;
        let (init_code, _) = self.memory.get(offset, size);

        let forwarded = if evm.config.rules.is_eip150 {
            gas::all_but_one_64th(self.gas.remaining())
        } else {
            self.gas.remaining()
        };
        self.gas.charge(forwarded)?;

        let creator = self.frame.context.address;
        let depth = self.frame.context.depth + 1;
        let (result, address) =
            evm.create_contract(creator, value, Bytes::from(init_code), forwarded, depth);
        self.gas.refund(result.gas_left);
        self.absorb_signals(&result);

        if result.status == Status::Reverted {
            self.set_return_data(result);
        } else {
            self.return_data.clear();
            self.return_taint.clear();
        }

        let pushed = address.map(|a| a.to_word()).unwrap_or_default();
        self.stack.push_safe(pushed)?;
        Ok(Control::Continue)
    }

    fn exit_with(&mut self, status: Status) -> EvmResult<Control> {
        let [(offset, _), (size, _)] = self.stack.popn()?;
        let (offset, size) = self.expand_memory(offset, size)?;
        let (output, labels) = self.memory.get(offset, size);
        self.signal_exit(&labels);
        self.output = output;
        self.output_taint = labels;
        Ok(Control::Halt(status))
    }

    pub(super) fn op_return(&mut self) -> EvmResult<Control> {
        self.exit_with(Status::Returned)
    }

    pub(super) fn op_revert(&mut self) -> EvmResult<Control> {
        self.exit_with(Status::Reverted)
    }

    pub(super) fn op_selfdestruct(&mut self, evm: &mut Evm<'_>) -> EvmResult<Control> {
        let (beneficiary, _) = self.stack.pop()?;
        let beneficiary = Address::from_word(beneficiary);
        let address = self.frame.context.address;
        let balance = evm.state.balance(&address);

        let rules = evm.config.rules;
        let new_account = if rules.is_eip158 {
            evm.state.is_empty(&beneficiary) && !balance.is_zero()
        } else {
            rules.is_eip150 && !evm.state.exists(&beneficiary)
        };
        if new_account {
            self.gas.charge(cost::SELFDESTRUCT_NEW_ACCOUNT)?;
        }

        evm.state.add_balance(&beneficiary, balance);
        evm.state.self_destruct(&address);
        Ok(Control::Halt(Status::Stopped))
    }
}
