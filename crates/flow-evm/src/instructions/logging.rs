//! LOG0..LOG4

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::gas;
use crate::interpreter::{Control, Interpreter};
use crate::result::Log;
use flow_primitives::H256;

impl Interpreter {
    pub(super) fn op_log(&mut self, topic_count: usize, evm: &mut Evm<'_>) -> EvmResult<Control> {
        let [(offset, _), (size, _)] = self.stack.popn()?;
        let mut topics = Vec::with_capacity(topic_count);
        for _ in 0..topic_count {
            let (topic, _) = self.stack.pop()?;
            topics.push(H256::from_word(topic));
        }

        let (offset, size) = self.expand_memory(offset, size)?;
        self.gas.charge(gas::log_gas(size))?;

        let (data, _) = self.memory.get(offset, size);
        evm.state.add_log(Log {
            address: self.frame.context.address,
            topics,
            data,
        });
        Ok(Control::Continue)
    }
}
