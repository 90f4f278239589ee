//! SHA3: the digest carries the OR of the hashed bytes' labels

use crate::error::EvmResult;
use crate::evm::Evm;
use crate::gas;
use crate::interpreter::{Control, Interpreter};
use flow_primitives::keccak256;

impl Interpreter {
    pub(super) fn op_sha3(&mut self, evm: &mut Evm<'_>) -> EvmResult<Control> {
        let [(offset, _), (size, _)] = self.stack.popn()?;
        let (offset, size) = self.expand_memory(offset, size)?;
        self.gas.charge(gas::sha3_gas(size))?;

        let (data, _) = self.memory.get_ptr(offset, size);
        let hash = keccak256(data);
        if evm.config.record_preimages {
            evm.state.add_preimage(hash, data);
        }

        let label = self.memory.fold_labels(offset, size);
        self.stack.push(hash.to_word(), label)?;
        Ok(Control::Continue)
    }
}
