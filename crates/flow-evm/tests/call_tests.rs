//! Call engine tests for flow-evm
//!
//! Test categories:
//! 1. Taint across frames
//! 2. Rollback and isolation
//! 3. Depth limit
//! 4. Contract creation

use bytes::Bytes;
use flow_evm::{
    contract_address, CallContext, EvmConfig, EvmError, Evm, ExecutionResult, Fork,
    InMemoryState, Status, StateStore, TaintLabel,
};
use flow_primitives::{Address, Word};

// =============================================================================
// Test Helpers
// =============================================================================

const GAS: u64 = 1_000_000;

const RETURN_TOP: [u8; 8] = [0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];

fn addr(b: u8) -> Address {
    Address::from_bytes([b; 20])
}

fn origin() -> Address {
    addr(0xee)
}

/// Push call operands for `op` to `to` forwarding all gas
fn call_op(op: u8, to: Address, with_value: bool, regions: [u8; 4]) -> Vec<u8> {
    let [in_offset, in_size, out_offset, out_size] = regions;
    let mut code = vec![0x60, out_size, 0x60, out_offset, 0x60, in_size, 0x60, in_offset];
    if with_value {
        code.extend([0x60, 0x00]);
    }
    code.push(0x73);
    code.extend_from_slice(to.as_bytes());
    code.extend([0x5a, op]);
    code
}

fn calldata(arg: u8) -> Bytes {
    let mut data = vec![0xca, 0xfe, 0xba, 0xbe];
    let mut word = [0u8; 32];
    word[31] = arg;
    data.extend_from_slice(&word);
    Bytes::from(data)
}

fn run(state: &mut InMemoryState, config: EvmConfig, to: Address, input: Bytes) -> ExecutionResult {
    let mut evm = Evm::new(state).with_config(config);
    evm.call(CallContext::new(to, origin(), Word::zero(), input, GAS))
}

/// CALLDATACOPY(4, 4, 32): argument 0 into memory [4, 36)
const COPY_ARG: [u8; 7] = [0x60, 0x20, 0x60, 0x04, 0x60, 0x04, 0x37];

/// Returns argument 0 doubled
const DOUBLER: [u8; 16] = [
    0x60, 0x04, 0x35, 0x80, 0x01, // arg0 DUP1 ADD
    0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3, // RETURN_TOP
    0x00, 0x00, 0x00,
];

// =============================================================================
// 1. Taint across frames
// =============================================================================

mod taint_across_frames {
    use super::*;

    /// Caller forwarding its argument to addr(2) with `op`, then returning
    /// the out region [64, 96)
    fn forwarder(op: u8) -> Vec<u8> {
        let mut code = COPY_ARG.to_vec();
        code.extend(call_op(op, addr(2), op == 0xf1, [0x00, 0x24, 0x40, 0x20]));
        code.extend([0x50, 0x60, 0x20, 0x60, 0x40, 0xf3]);
        code
    }

    #[test]
    fn test_return_taint_visible_to_caller() {
        let mut state = InMemoryState::new();
        state.set_code(&addr(2), Bytes::from_static(&DOUBLER));
        state.set_code(&addr(1), Bytes::from(forwarder(0xf1)));

        let result = run(&mut state, EvmConfig::default(), addr(1), calldata(21));
        assert_eq!(result.status, Status::Returned);
        assert_eq!(result.output[31], 42);
        assert!(result.output_taint.iter().all(|l| *l == TaintLabel::param(0)));
        assert_eq!(result.taint_signal, TaintLabel::param(0));
    }

    #[test]
    fn test_staticcall_forwards_taint() {
        let mut state = InMemoryState::new();
        state.set_code(&addr(2), Bytes::from_static(&DOUBLER));
        state.set_code(&addr(1), Bytes::from(forwarder(0xfa)));

        let result = run(&mut state, EvmConfig::default(), addr(1), calldata(4));
        assert_eq!(result.output[31], 8);
        assert!(result.taint_signal.has_param(0));
    }

    #[test]
    fn test_returndatacopy_carries_labels() {
        let mut state = InMemoryState::new();
        state.set_code(&addr(2), Bytes::from_static(&DOUBLER));
        // Forward with an empty out region, then RETURNDATACOPY(0, 0, 32)
        let mut code = COPY_ARG.to_vec();
        code.extend(call_op(0xf1, addr(2), true, [0x00, 0x24, 0x00, 0x00]));
        code.extend([0x50, 0x60, 0x20, 0x60, 0x00, 0x60, 0x00, 0x3e]);
        code.extend([0x60, 0x20, 0x60, 0x00, 0xf3]);
        state.set_code(&addr(1), Bytes::from(code));

        let result = run(&mut state, EvmConfig::default(), addr(1), calldata(3));
        assert_eq!(result.output[31], 6);
        assert!(result.output_taint.iter().all(|l| *l == TaintLabel::param(0)));
    }

    #[test]
    fn test_call_flag_is_safe() {
        let mut state = InMemoryState::new();
        state.set_code(&addr(2), Bytes::from_static(&DOUBLER));
        let mut code = COPY_ARG.to_vec();
        code.extend(call_op(0xf1, addr(2), true, [0x00, 0x24, 0x00, 0x00]));
        code.extend(RETURN_TOP);
        state.set_code(&addr(1), Bytes::from(code));

        let result = run(&mut state, EvmConfig::default(), addr(1), calldata(3));
        assert_eq!(result.output[31], 1);
        assert!(result.output_taint.iter().all(|l| l.is_safe()));
        // The callee's tainted return still reached the caller's signal
        assert_eq!(result.taint_signal, TaintLabel::param(0));
    }
}

// =============================================================================
// 2. Rollback and isolation
// =============================================================================

mod rollback {
    use super::*;

    const STORE_ONE: [u8; 5] = [0x60, 0x01, 0x60, 0x00, 0x55];

    #[test]
    fn test_staticcall_sstore_fails_with_safe_flag() {
        let mut state = InMemoryState::new();
        state.set_code(&addr(2), Bytes::from_static(&STORE_ONE));
        let mut code = call_op(0xfa, addr(2), false, [0, 0, 0, 0]);
        code.extend(RETURN_TOP);
        state.set_code(&addr(1), Bytes::from(code));

        let result = run(&mut state, EvmConfig::default(), addr(1), Bytes::new());
        assert_eq!(result.status, Status::Returned);
        assert_eq!(Word::from_big_endian(&result.output), Word::zero());
        assert!(result.output_taint.iter().all(|l| l.is_safe()));
        assert_eq!(state.storage(&addr(2), Word::zero()), Word::zero());
    }

    #[test]
    fn test_faulted_callee_changes_discarded() {
        let mut state = InMemoryState::new();
        let mut callee = STORE_ONE.to_vec();
        callee.push(0xfe);
        state.set_code(&addr(2), Bytes::from(callee));
        // Our own write happens first and survives the failed call
        let mut code = STORE_ONE.to_vec();
        code.extend(call_op(0xf1, addr(2), true, [0, 0, 0, 0]));
        state.set_code(&addr(1), Bytes::from(code));

        let result = run(&mut state, EvmConfig::default(), addr(1), Bytes::new());
        assert_eq!(result.status, Status::Stopped);
        assert_eq!(state.storage(&addr(2), Word::zero()), Word::zero());
        assert_eq!(state.storage(&addr(1), Word::zero()), Word::one());
    }

    #[test]
    fn test_top_level_revert_discards_writes() {
        let mut state = InMemoryState::new();
        let mut code = STORE_ONE.to_vec();
        code.extend([0x60, 0x00, 0x60, 0x00, 0xfd]);
        state.set_code(&addr(1), Bytes::from(code));

        let result = run(&mut state, EvmConfig::default(), addr(1), Bytes::new());
        assert_eq!(result.status, Status::Reverted);
        assert_eq!(result.error, Some(EvmError::ExecutionReverted));
        assert!(result.gas_left > 0);
        assert_eq!(state.storage(&addr(1), Word::zero()), Word::zero());
    }

    #[test]
    fn test_callcode_writes_caller_storage() {
        let mut state = InMemoryState::new();
        state.set_code(&addr(2), Bytes::from_static(&STORE_ONE));
        let code = call_op(0xf2, addr(2), true, [0, 0, 0, 0]);
        state.set_code(&addr(1), Bytes::from(code));

        let result = run(&mut state, EvmConfig::default(), addr(1), Bytes::new());
        assert!(result.is_success());
        assert_eq!(state.storage(&addr(1), Word::zero()), Word::one());
        assert_eq!(state.storage(&addr(2), Word::zero()), Word::zero());
    }
}

// =============================================================================
// 3. Depth limit
// =============================================================================

mod depth {
    use super::*;

    /// Increments slot 0 and calls itself
    fn recursive() -> Vec<u8> {
        let mut code = vec![0x60, 0x00, 0x54, 0x60, 0x01, 0x01, 0x60, 0x00, 0x55];
        code.extend([0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00]);
        code.extend([0x30, 0x5a, 0xf1, 0x00]);
        code
    }

    #[test]
    fn test_recursion_stops_at_configured_depth() {
        let mut state = InMemoryState::new();
        state.set_code(&addr(1), Bytes::from(recursive()));
        let config = EvmConfig {
            max_call_depth: 5,
            ..EvmConfig::default()
        };

        let result = run(&mut state, config, addr(1), Bytes::new());
        assert_eq!(result.status, Status::Stopped);
        // Frames at depth 0 through 5 each ran once
        assert_eq!(state.storage(&addr(1), Word::zero()), Word::from(6u64));
    }

    #[test]
    fn test_top_level_beyond_limit() {
        let mut state = InMemoryState::new();
        let mut evm = Evm::new(&mut state).with_config(EvmConfig {
            max_call_depth: 2,
            ..EvmConfig::default()
        });
        let mut ctx = CallContext::new(addr(1), origin(), Word::zero(), Bytes::new(), 5000);
        ctx.depth = 3;
        let result = evm.call(ctx);
        assert_eq!(result.error, Some(EvmError::CallDepthExceeded(2)));
        assert_eq!(result.gas_left, 5000);
    }
}

// =============================================================================
// 4. Contract creation
// =============================================================================

mod creation {
    use super::*;

    /// Init code returning 0x6001 zero-padded bytes of runtime code
    const OVERSIZED_INIT: [u8; 6] = [0x61, 0x60, 0x01, 0x60, 0x00, 0xf3];

    fn deploy(config: EvmConfig, init: &[u8], gas: u64) -> (ExecutionResult, Option<Address>, InMemoryState) {
        let mut state = InMemoryState::new();
        let (result, address) = {
            let mut evm = Evm::new(&mut state).with_config(config);
            evm.deploy(origin(), Word::zero(), Bytes::copy_from_slice(init), gas)
        };
        (result, address, state)
    }

    #[test]
    fn test_code_size_limit_from_spurious_dragon() {
        let (result, address, _) = deploy(EvmConfig::for_fork(Fork::SpuriousDragon), &OVERSIZED_INIT, 6_000_000);
        assert_eq!(result.error, Some(EvmError::MaxCodeSizeExceeded));
        assert!(address.is_none());

        let (result, address, state) =
            deploy(EvmConfig::for_fork(Fork::TangerineWhistle), &OVERSIZED_INIT, 6_000_000);
        assert!(result.is_success());
        let address = address.unwrap();
        assert_eq!(state.code_size(&address), 0x6001);
    }

    #[test]
    fn test_deploy_address_from_nonce() {
        // Returns one byte of code
        let init = [0x60, 0x01, 0x60, 0x00, 0xf3];
        let (result, address, state) = deploy(EvmConfig::default(), &init, 100_000);
        assert!(result.is_success());
        assert_eq!(address, Some(contract_address(&origin(), 0)));
        assert_eq!(state.nonce(&origin()), 1);
        assert_eq!(result.gas_used(), 3 + 3 + 3 + 200);
    }

    #[test]
    fn test_reverting_init_code() {
        // REVERT(0, 0)
        let (result, address, state) = deploy(EvmConfig::default(), &[0x60, 0x00, 0x60, 0x00, 0xfd], 100_000);
        assert_eq!(result.status, Status::Reverted);
        assert!(address.is_none());
        assert!(!state.exists(&contract_address(&origin(), 0)));
        // The nonce bump survives the revert
        assert_eq!(state.nonce(&origin()), 1);
    }
}
