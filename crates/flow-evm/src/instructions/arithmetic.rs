//! Arithmetic: ADD, MUL, SUB, DIV, SDIV, MOD, SMOD, ADDMOD, MULMOD, EXP, SIGNEXTEND
//!
//! Results carry the OR of the operand labels. ADDMOD and MULMOD with a zero
//! modulus carry only the modulus label.

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::gas;
use crate::interpreter::{Control, Interpreter};
use flow_primitives::{word, TaintLabel, Word};

/// Add an overflow flag to input-derived results when tracking is on
fn overflow_label(evm: &Evm<'_>, label: TaintLabel, wrapped: bool) -> TaintLabel {
    if !evm.config.track_overflow || !label.is_input_derived() {
        return label;
    }
    if wrapped {
        label | TaintLabel::OVERFLOW
    } else {
        label | TaintLabel::POTENTIAL_OVERFLOW
    }
}

impl Interpreter {
    fn binary(&mut self, f: impl FnOnce(Word, Word) -> Word) -> EvmResult<Control> {
        let [(a, la), (b, lb)] = self.stack.popn()?;
        self.stack.push(f(a, b), la | lb)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_add(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let [(a, la), (b, lb)] = self.stack.popn()?;
        let (sum, wrapped) = a.overflowing_add(b);
        self.stack.push(sum, overflow_label(evm, la | lb, wrapped))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_mul(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let [(a, la), (b, lb)] = self.stack.popn()?;
        let (product, wrapped) = a.overflowing_mul(b);
        self.stack.push(product, overflow_label(evm, la | lb, wrapped))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_sub(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let [(a, la), (b, lb)] = self.stack.popn()?;
        let (difference, wrapped) = a.overflowing_sub(b);
        self.stack.push(difference, overflow_label(evm, la | lb, wrapped))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_div(&mut self) -> EvmResult<Control> {
        self.binary(word::div)
    }

    pub(super) fn op_sdiv(&mut self) -> EvmResult<Control> {
        self.binary(word::sdiv)
    }

    pub(super) fn op_mod(&mut self) -> EvmResult<Control> {
        self.binary(word::rem)
    }

    pub(super) fn op_smod(&mut self) -> EvmResult<Control> {
        self.binary(word::smod)
    }

    fn ternary_mod(&mut self, f: impl FnOnce(Word, Word, Word) -> Word) -> EvmResult<Control> {
        let [(a, la), (b, lb), (n, ln)] = self.stack.popn()?;
        if n.is_zero() {
            self.stack.push(Word::zero(), ln)?;
        } else {
            self.stack.push(f(a, b, n), la | lb | ln)?;
        }
        Ok(Control::Continue)
    }

    pub(super) fn op_addmod(&mut self) -> EvmResult<Control> {
        self.ternary_mod(word::addmod)
    }

    pub(super) fn op_mulmod(&mut self) -> EvmResult<Control> {
        self.ternary_mod(word::mulmod)
    }

    pub(super) fn op_exp(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let [(base, lb), (exponent, le)] = self.stack.popn()?;
        let byte_cost = evm.schedule.exp_byte_cost(&evm.config.rules);
        self.gas.charge(gas::exp_gas(exponent, byte_cost))?;

        let (power, wrapped) = word::overflowing_exp(base, exponent);
        self.stack.push(power, overflow_label(evm, lb | le, wrapped))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_signextend(&mut self) -> EvmResult<Control> {
        self.binary(word::signextend)
    }
}
