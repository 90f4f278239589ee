//! Gas accounting
//!
//! Static per-opcode costs come from a [`GasSchedule`]; dynamic parts
//! (memory expansion, copies, hashing, logs) are computed by the helpers in
//! this module and charged by the instruction handlers.

use crate::config::Rules;
use crate::error::{EvmError, EvmResult};
use crate::opcode::Opcode;
use flow_primitives::Word;

/// Gas costs for EVM operations
pub mod cost {
    /// Zero gas
    pub const ZERO: u64 = 0;
    /// Base gas
    pub const BASE: u64 = 2;
    /// Very low gas
    pub const VERYLOW: u64 = 3;
    /// Low gas
    pub const LOW: u64 = 5;
    /// Mid gas
    pub const MID: u64 = 8;
    /// High gas
    pub const HIGH: u64 = 10;

    /// Jump dest gas
    pub const JUMPDEST: u64 = 1;
    /// Exp gas
    pub const EXP: u64 = 10;
    /// Exp byte gas before EIP-160
    pub const EXP_BYTE_FRONTIER: u64 = 10;
    /// Exp byte gas from EIP-160
    pub const EXP_BYTE: u64 = 50;
    /// SHA3 base gas
    pub const SHA3: u64 = 30;
    /// SHA3 word gas
    pub const SHA3_WORD: u64 = 6;
    /// Blockhash gas
    pub const BLOCKHASH: u64 = 20;

    /// Balance gas before EIP-150
    pub const BALANCE_FRONTIER: u64 = 20;
    /// Balance gas from EIP-150
    pub const BALANCE: u64 = 400;
    /// Ext code gas before EIP-150
    pub const EXTCODE_FRONTIER: u64 = 20;
    /// Ext code gas from EIP-150
    pub const EXTCODE: u64 = 700;

    /// Sload gas before EIP-150
    pub const SLOAD_FRONTIER: u64 = 50;
    /// Sload gas from EIP-150
    pub const SLOAD: u64 = 200;
    /// Sstore set gas
    pub const SSTORE_SET: u64 = 20000;
    /// Sstore reset gas
    pub const SSTORE_RESET: u64 = 5000;

    /// Log gas
    pub const LOG: u64 = 375;
    /// Log topic gas
    pub const LOG_TOPIC: u64 = 375;
    /// Log data gas (per byte)
    pub const LOG_DATA: u64 = 8;

    /// Create gas
    pub const CREATE: u64 = 32000;
    /// Code deposit gas (per byte)
    pub const CREATE_DATA: u64 = 200;
    /// Call gas before EIP-150
    pub const CALL_FRONTIER: u64 = 40;
    /// Call gas from EIP-150
    pub const CALL: u64 = 700;
    /// Call value transfer gas
    pub const CALL_VALUE: u64 = 9000;
    /// Call new account gas
    pub const CALL_NEW_ACCOUNT: u64 = 25000;
    /// Call stipend
    pub const CALL_STIPEND: u64 = 2300;

    /// Memory gas per word
    pub const MEMORY: u64 = 3;
    /// Copy gas per word
    pub const COPY: u64 = 3;

    /// Selfdestruct gas from EIP-150
    pub const SELFDESTRUCT: u64 = 5000;
    /// Selfdestruct new account gas
    pub const SELFDESTRUCT_NEW_ACCOUNT: u64 = 25000;

    /// Max call depth
    pub const MAX_CALL_DEPTH: usize = 1024;
    /// Max stack size
    pub const MAX_STACK_SIZE: usize = 1024;
    /// Max code size (EIP-170)
    pub const MAX_CODE_SIZE: usize = 24576;
    /// Largest memory the gas formula is evaluated for
    pub const MAX_MEMORY_SIZE: u64 = 0x1f_ffff_ffe0;
}

/// Pure cost function of an opcode under a set of fork rules
pub trait GasSchedule: Send + Sync {
    /// Static gas charged before the handler runs
    fn cost(&self, opcode: Opcode, rules: &Rules) -> u64;

    /// Per-byte cost of the EXP exponent
    fn exp_byte_cost(&self, rules: &Rules) -> u64 {
        if rules.is_eip158 {
            cost::EXP_BYTE
        } else {
            cost::EXP_BYTE_FRONTIER
        }
    }

    /// SSTORE cost given the current and the new slot value
    fn sstore_cost(&self, current: Word, new: Word) -> u64 {
        if current.is_zero() && !new.is_zero() {
            cost::SSTORE_SET
        } else {
            cost::SSTORE_RESET
        }
    }

    /// Dynamic part of a CALL-family charge: value transfer and account creation
    fn call_cost(&self, rules: &Rules, transfers_value: bool, creates_account: bool) -> u64 {
        let mut gas = 0;
        if transfers_value {
            gas += cost::CALL_VALUE;
        }
        if creates_account && (transfers_value || !rules.is_eip158) {
            gas += cost::CALL_NEW_ACCOUNT;
        }
        gas
    }

    /// Per-byte cost of storing created code
    fn create_data_cost(&self) -> u64 {
        cost::CREATE_DATA
    }
}

/// Frontier through Constantinople gas table
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSchedule;

impl GasSchedule for StandardSchedule {
    fn cost(&self, opcode: Opcode, rules: &Rules) -> u64 {
        use Opcode::*;

        let eip150 = rules.is_eip150;
        match opcode {
            STOP | RETURN | REVERT | INVALID | SSTORE => cost::ZERO,

            ADDRESS | ORIGIN | CALLER | CALLVALUE | CALLDATASIZE | CODESIZE | GASPRICE
            | COINBASE | TIMESTAMP | NUMBER | DIFFICULTY | GASLIMIT | RETURNDATASIZE | POP
            | PC | MSIZE | GAS => cost::BASE,

            ADD | SUB | NOT | LT | GT | SLT | SGT | EQ | ISZERO | AND | OR | XOR | BYTE
            | SHL | SHR | SAR | CALLDATALOAD | MLOAD | MSTORE | MSTORE8 | CALLDATACOPY
            | CODECOPY | RETURNDATACOPY => cost::VERYLOW,

            MUL | DIV | SDIV | MOD | SMOD | SIGNEXTEND => cost::LOW,

            ADDMOD | MULMOD | JUMP => cost::MID,

            JUMPI => cost::HIGH,

            JUMPDEST => cost::JUMPDEST,

            EXP => cost::EXP,
            SHA3 => cost::SHA3,
            BLOCKHASH => cost::BLOCKHASH,

            BALANCE if eip150 => cost::BALANCE,
            BALANCE => cost::BALANCE_FRONTIER,
            EXTCODESIZE | EXTCODECOPY if eip150 => cost::EXTCODE,
            EXTCODESIZE | EXTCODECOPY => cost::EXTCODE_FRONTIER,
            SLOAD if eip150 => cost::SLOAD,
            SLOAD => cost::SLOAD_FRONTIER,
            CALL | CALLCODE | DELEGATECALL | STATICCALL if eip150 => cost::CALL,
            CALL | CALLCODE | DELEGATECALL | STATICCALL => cost::CALL_FRONTIER,
            SELFDESTRUCT if eip150 => cost::SELFDESTRUCT,
            SELFDESTRUCT => cost::ZERO,

            LOG0 | LOG1 | LOG2 | LOG3 | LOG4 => {
                cost::LOG + cost::LOG_TOPIC * opcode.log_topics() as u64
            }

            CREATE => cost::CREATE,

            // PUSH, DUP, SWAP
            _ => cost::VERYLOW,
        }
    }
}

/// Remaining gas of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gas {
    limit: u64,
    remaining: u64,
}

impl Gas {
    /// Start with the full limit available
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Gas given to the frame
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Gas still available
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Deduct `amount`, failing with OutOfGas when it is not available
    pub fn charge(&mut self, amount: u64) -> EvmResult<()> {
        if amount > self.remaining {
            return Err(EvmError::OutOfGas);
        }
        self.remaining -= amount;
        Ok(())
    }

    /// Return unused gas from a sub-call
    pub fn refund(&mut self, amount: u64) {
        self.remaining = self.remaining.saturating_add(amount).min(self.limit);
    }
}

/// All but one 64th of `available` (EIP-150)
pub fn all_but_one_64th(available: u64) -> u64 {
    available - available / 64
}

/// Gas forwarded to a sub-call for a requested amount.
///
/// Under EIP-150 the request is capped at all but one 64th of what is
/// available; before it the full request must be affordable.
pub fn call_gas(rules: &Rules, available: u64, requested: Word) -> EvmResult<u64> {
    if rules.is_eip150 {
        let cap = all_but_one_64th(available);
        if requested > Word::from(cap) {
            return Ok(cap);
        }
        return Ok(requested.low_u64());
    }
    if requested > Word::from(available) {
        return Err(EvmError::OutOfGas);
    }
    Ok(requested.low_u64())
}

/// Calculate memory expansion cost
pub fn memory_gas(current_size: usize, new_size: usize) -> u64 {
    if new_size <= current_size {
        return 0;
    }

    let new_cost = memory_word_cost(new_size.div_ceil(32));
    let old_cost = memory_word_cost(current_size.div_ceil(32));

    new_cost.saturating_sub(old_cost)
}

fn memory_word_cost(words: usize) -> u64 {
    let words = words as u64;
    cost::MEMORY
        .saturating_mul(words)
        .saturating_add(words.saturating_mul(words) / 512)
}

/// Calculate copy cost (CALLDATACOPY, CODECOPY, EXTCODECOPY, RETURNDATACOPY)
pub fn copy_gas(length: usize) -> u64 {
    cost::COPY.saturating_mul(length.div_ceil(32) as u64)
}

/// Dynamic part of EXP: per significant byte of the exponent
pub fn exp_gas(exponent: Word, byte_cost: u64) -> u64 {
    let bytes = exponent.bits().div_ceil(8) as u64;
    byte_cost * bytes
}

/// Dynamic part of SHA3: per hashed word
pub fn sha3_gas(length: usize) -> u64 {
    cost::SHA3_WORD.saturating_mul(length.div_ceil(32) as u64)
}

/// Dynamic part of LOG: per data byte
pub fn log_gas(data_size: usize) -> u64 {
    cost::LOG_DATA.saturating_mul(data_size as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_gas() {
        let rules = Rules::default();
        let schedule = StandardSchedule;
        assert_eq!(schedule.cost(Opcode::STOP, &rules), 0);
        assert_eq!(schedule.cost(Opcode::ADD, &rules), 3);
        assert_eq!(schedule.cost(Opcode::MUL, &rules), 5);
        assert_eq!(schedule.cost(Opcode::JUMP, &rules), 8);
        assert_eq!(schedule.cost(Opcode::JUMPI, &rules), 10);
        assert_eq!(schedule.cost(Opcode::PUSH1, &rules), 3);
        assert_eq!(schedule.cost(Opcode::SWAP16, &rules), 3);
        assert_eq!(schedule.cost(Opcode::LOG2, &rules), 375 * 3);
    }

    #[test]
    fn test_eip150_repricing() {
        let schedule = StandardSchedule;
        let homestead = Rules::homestead();
        let tangerine = Rules::tangerine_whistle();
        assert_eq!(schedule.cost(Opcode::SLOAD, &homestead), 50);
        assert_eq!(schedule.cost(Opcode::SLOAD, &tangerine), 200);
        assert_eq!(schedule.cost(Opcode::CALL, &homestead), 40);
        assert_eq!(schedule.cost(Opcode::CALL, &tangerine), 700);
        assert_eq!(schedule.cost(Opcode::SELFDESTRUCT, &homestead), 0);
        assert_eq!(schedule.cost(Opcode::SELFDESTRUCT, &tangerine), 5000);
    }

    #[test]
    fn test_gas_charge() {
        let mut gas = Gas::new(100);
        gas.charge(30).unwrap();
        assert_eq!(gas.remaining(), 70);
        assert_eq!(gas.charge(71), Err(EvmError::OutOfGas));
        assert_eq!(gas.remaining(), 70);
        gas.refund(10);
        assert_eq!(gas.remaining(), 80);
        gas.refund(50);
        assert_eq!(gas.remaining(), 100);
    }

    #[test]
    fn test_call_gas_retention() {
        let rules = Rules::tangerine_whistle();
        // 6400 available: at most 6300 may be forwarded
        assert_eq!(call_gas(&rules, 6400, Word::MAX).unwrap(), 6300);
        assert_eq!(call_gas(&rules, 6400, Word::from(1000u64)).unwrap(), 1000);

        let frontier = Rules::frontier();
        assert_eq!(call_gas(&frontier, 6400, Word::from(6400u64)).unwrap(), 6400);
        assert_eq!(
            call_gas(&frontier, 6400, Word::from(6401u64)),
            Err(EvmError::OutOfGas)
        );
    }

    #[test]
    fn test_memory_gas() {
        assert_eq!(memory_gas(32, 32), 0);
        assert_eq!(memory_gas(64, 32), 0);
        assert_eq!(memory_gas(0, 32), 3);
        assert_eq!(memory_gas(0, 64), 6);
        // 1024 words: 3*1024 + 1024^2/512
        assert_eq!(memory_gas(0, 32 * 1024), 3072 + 2048);
    }

    #[test]
    fn test_memory_gas_saturates() {
        assert!(memory_gas(0, usize::MAX) > u64::from(u32::MAX));
    }

    #[test]
    fn test_call_cost() {
        let schedule = StandardSchedule;
        let spurious = Rules::spurious_dragon();
        let homestead = Rules::homestead();
        assert_eq!(schedule.call_cost(&spurious, false, false), 0);
        assert_eq!(schedule.call_cost(&spurious, true, false), 9000);
        assert_eq!(schedule.call_cost(&spurious, true, true), 34000);
        // After EIP-158 only value-bearing calls pay for new accounts
        assert_eq!(schedule.call_cost(&spurious, false, true), 0);
        assert_eq!(schedule.call_cost(&homestead, false, true), 25000);
    }

    #[test]
    fn test_copy_gas() {
        assert_eq!(copy_gas(0), 0);
        assert_eq!(copy_gas(32), 3);
        assert_eq!(copy_gas(33), 6);
    }

    #[test]
    fn test_exp_gas() {
        assert_eq!(exp_gas(Word::zero(), cost::EXP_BYTE), 0);
        assert_eq!(exp_gas(Word::from(1u64), cost::EXP_BYTE), 50);
        assert_eq!(exp_gas(Word::from(256u64), cost::EXP_BYTE), 100);
        assert_eq!(exp_gas(Word::MAX, cost::EXP_BYTE_FRONTIER), 320);
    }

    #[test]
    fn test_sha3_and_log_gas() {
        assert_eq!(sha3_gas(0), 0);
        assert_eq!(sha3_gas(33), 12);
        assert_eq!(log_gas(10), 80);
    }

    #[test]
    fn test_sstore_cost() {
        let schedule = StandardSchedule;
        assert_eq!(schedule.sstore_cost(Word::zero(), Word::one()), 20000);
        assert_eq!(schedule.sstore_cost(Word::one(), Word::from(2u64)), 5000);
        assert_eq!(schedule.sstore_cost(Word::one(), Word::zero()), 5000);
    }
}
