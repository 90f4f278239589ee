//! Property tests: value and label channels never drift apart

use bytes::Bytes;
use flow_evm::{CallContext, DualStack, Evm, InMemoryState, Memory, StateStore, Status, TaintLabel};
use flow_primitives::{Address, Word};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum StackOp {
    Push(u64),
    Pop,
    Dup(usize),
    Swap(usize),
}

fn stack_op() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        3 => any::<u64>().prop_map(StackOp::Push),
        1 => Just(StackOp::Pop),
        1 => (1usize..=16).prop_map(StackOp::Dup),
        1 => (1usize..=16).prop_map(StackOp::Swap),
    ]
}

/// Label a value deterministically so alignment can be checked after shuffling
fn label_for(value: Word) -> TaintLabel {
    TaintLabel::param((value.low_u64() % 56) as usize)
}

#[derive(Debug, Clone)]
enum MemoryOp {
    Word(u16, u64),
    Byte(u16, u8),
}

fn memory_op() -> impl Strategy<Value = MemoryOp> {
    prop_oneof![
        (0u16..2048, any::<u64>()).prop_map(|(o, v)| MemoryOp::Word(o, v)),
        (0u16..2048, any::<u8>()).prop_map(|(o, v)| MemoryOp::Byte(o, v)),
    ]
}

proptest! {
    #[test]
    fn stack_channels_stay_aligned(ops in prop::collection::vec(stack_op(), 0..200)) {
        let mut stack = DualStack::new();
        for op in ops {
            let before = stack.len();
            let outcome = match op {
                StackOp::Push(v) => {
                    let value = Word::from(v);
                    stack.push(value, label_for(value))
                }
                StackOp::Pop => stack.pop().map(|_| ()),
                StackOp::Dup(n) => stack.dup(n),
                StackOp::Swap(n) => stack.swap(n),
            };
            if outcome.is_err() {
                prop_assert_eq!(stack.len(), before);
            }
            prop_assert_eq!(stack.len(), stack.label_len());
        }
        for (value, label) in stack.values().iter().zip(stack.labels()) {
            prop_assert_eq!(*label, label_for(*value));
        }
    }

    #[test]
    fn memory_channels_stay_aligned(ops in prop::collection::vec(memory_op(), 0..100)) {
        let mut memory = Memory::new();
        for op in ops {
            match op {
                MemoryOp::Word(offset, v) => {
                    let offset = offset as usize;
                    let size = Memory::required_size(offset, 32).unwrap();
                    memory.resize(size);
                    let value = Word::from(v);
                    memory.set_word(offset, value, label_for(value));
                    prop_assert_eq!(memory.load_word(offset), (value, label_for(value)));
                }
                MemoryOp::Byte(offset, v) => {
                    let offset = offset as usize;
                    memory.resize(Memory::required_size(offset, 1).unwrap());
                    memory.set_byte(offset, v, TaintLabel::VALUE);
                    prop_assert_eq!(memory.bytes()[offset], v);
                }
            }
            prop_assert_eq!(memory.len(), memory.label_len());
            prop_assert_eq!(memory.len() % 32, 0);
        }
    }

    #[test]
    fn arbitrary_code_never_panics(
        code in prop::collection::vec(any::<u8>(), 0..96),
        input in prop::collection::vec(any::<u8>(), 0..68),
    ) {
        let target = Address::from_bytes([0x11; 20]);
        let mut state = InMemoryState::new();
        state.set_code(&target, Bytes::from(code));
        let mut evm = Evm::new(&mut state);

        let gas = 200_000;
        let ctx = CallContext::new(target, Address::from_bytes([0x22; 20]), Word::zero(), Bytes::from(input), gas);
        let result = evm.call(ctx);

        prop_assert!(result.gas_left <= gas);
        prop_assert_eq!(result.output.len(), result.output_taint.len());
        if result.status == Status::Faulted {
            prop_assert!(result.output.is_empty());
        }
    }
}
