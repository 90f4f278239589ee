//! Block information: BLOCKHASH, COINBASE, TIMESTAMP, NUMBER, DIFFICULTY, GASLIMIT

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::interpreter::{Control, Interpreter};
use flow_primitives::{word, TaintLabel, Word};

/// Number of past blocks BLOCKHASH can see
const BLOCKHASH_WINDOW: u64 = 256;

impl Interpreter {
    pub(super) fn op_blockhash(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        let (number, label) = self.stack.pop()?;
        let current = evm.block.number;

        let hit = word::to_u64(number)
            .filter(|n| *n < current && current - *n <= BLOCKHASH_WINDOW);
        match hit {
            Some(n) => self.stack.push(evm.state.block_hash(n).to_word(), label)?,
            None => self.stack.push(Word::zero(), TaintLabel::SAFE)?,
        }
        Ok(Control::Continue)
    }

    pub(super) fn op_coinbase(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        self.stack.push_safe(evm.block.coinbase.to_word())?;
        Ok(Control::Continue)
    }

    pub(super) fn op_timestamp(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        self.stack.push_safe(Word::from(evm.block.timestamp))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_number(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        self.stack.push_safe(Word::from(evm.block.number))?;
        Ok(Control::Continue)
    }

    pub(super) fn op_difficulty(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        self.stack.push_safe(evm.block.difficulty)?;
        Ok(Control::Continue)
    }

    pub(super) fn op_gaslimit(&mut self, evm: &Evm<'_>) -> EvmResult<Control> {
        self.stack.push_safe(Word::from(evm.block.gas_limit))?;
        Ok(Control::Continue)
    }
}
