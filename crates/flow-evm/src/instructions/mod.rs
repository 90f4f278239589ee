//! Opcode handlers
//!
//! Each submodule adds handlers for one opcode family to [`Interpreter`].
//! A handler pops exactly as many labels as values and pushes exactly as
//! many labels as values.

mod arithmetic;
mod bitwise;
mod block;
mod environment;
mod keccak;
mod logging;
mod stack_memory;
mod system;

use crate::error::{EvmError, EvmResult};
use crate::evm::Evm;
use crate::interpreter::{Control, Interpreter};
use crate::opcode::Opcode;
use crate::result::Status;

use system::CallKind;

impl Interpreter {
    /// Dispatch one decoded opcode
    pub(crate) fn execute(&mut self, opcode: Opcode, evm: &mut Evm<'_>) -> EvmResult<Control> {
        use Opcode::*;

        match opcode {
            STOP => Ok(Control::Halt(Status::Stopped)),

            // Arithmetic
            ADD => self.op_add(evm),
            MUL => self.op_mul(evm),
            SUB => self.op_sub(evm),
            DIV => self.op_div(),
            SDIV => self.op_sdiv(),
            MOD => self.op_mod(),
            SMOD => self.op_smod(),
            ADDMOD => self.op_addmod(),
            MULMOD => self.op_mulmod(),
            EXP => self.op_exp(evm),
            SIGNEXTEND => self.op_signextend(),

            // Comparison and bitwise
            LT => self.op_lt(),
            GT => self.op_gt(),
            SLT => self.op_slt(),
            SGT => self.op_sgt(),
            EQ => self.op_eq(),
            ISZERO => self.op_iszero(),
            AND => self.op_and(),
            OR => self.op_or(),
            XOR => self.op_xor(),
            NOT => self.op_not(),
            BYTE => self.op_byte(),
            SHL => self.op_shl(),
            SHR => self.op_shr(),
            SAR => self.op_sar(),

            SHA3 => self.op_sha3(evm),

            // Environment
            ADDRESS => self.op_address(),
            BALANCE => self.op_balance(evm),
            ORIGIN => self.op_origin(evm),
            CALLER => self.op_caller(),
            CALLVALUE => self.op_callvalue(),
            CALLDATALOAD => self.op_calldataload(),
            CALLDATASIZE => self.op_calldatasize(),
            CALLDATACOPY => self.op_calldatacopy(),
            CODESIZE => self.op_codesize(),
            CODECOPY => self.op_codecopy(),
            GASPRICE => self.op_gasprice(evm),
            EXTCODESIZE => self.op_extcodesize(evm),
            EXTCODECOPY => self.op_extcodecopy(evm),
            RETURNDATASIZE => self.op_returndatasize(),
            RETURNDATACOPY => self.op_returndatacopy(),

            // Block
            BLOCKHASH => self.op_blockhash(evm),
            COINBASE => self.op_coinbase(evm),
            TIMESTAMP => self.op_timestamp(evm),
            NUMBER => self.op_number(evm),
            DIFFICULTY => self.op_difficulty(evm),
            GASLIMIT => self.op_gaslimit(evm),

            // Stack, memory, storage and flow
            POP => self.op_pop(),
            MLOAD => self.op_mload(),
            MSTORE => self.op_mstore(),
            MSTORE8 => self.op_mstore8(),
            SLOAD => self.op_sload(evm),
            SSTORE => self.op_sstore(evm),
            JUMP => self.op_jump(evm),
            JUMPI => self.op_jumpi(evm),
            PC => self.op_pc(),
            MSIZE => self.op_msize(),
            GAS => self.op_gas(),
            JUMPDEST => Ok(Control::Continue),

            LOG0 | LOG1 | LOG2 | LOG3 | LOG4 => self.op_log(opcode.log_topics(), evm),

            // System
            CREATE => self.op_create(evm),
            CALL => self.op_call(CallKind::Call, evm),
            CALLCODE => self.op_call(CallKind::CallCode, evm),
            DELEGATECALL => self.op_call(CallKind::DelegateCall, evm),
            STATICCALL => self.op_call(CallKind::StaticCall, evm),
            RETURN => self.op_return(),
            REVERT => self.op_revert(),
            INVALID => Err(EvmError::InvalidOpcode(INVALID as u8)),
            SELFDESTRUCT => self.op_selfdestruct(evm),

            op if op.push_size() > 0 => self.op_push(op.push_size()),
            op if op.dup_depth() > 0 => self.op_dup(op.dup_depth()),
            op if op.swap_depth() > 0 => self.op_swap(op.swap_depth()),

            op => Err(EvmError::InvalidOpcode(op as u8)),
        }
    }
}
