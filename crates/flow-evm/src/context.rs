//! Execution context for a frame

use bytes::Bytes;
use flow_primitives::{keccak256, Address, TaintLabel, Word, H256};

/// Parameters of one call frame
#[derive(Clone, Debug)]
pub struct CallContext {
    /// Account whose storage and balance the frame acts on
    pub address: Address,
    /// Account the executing code was loaded from
    pub code_address: Address,
    /// Caller address
    pub caller: Address,
    /// Call value in wei
    pub value: Word,
    /// Call data
    pub input: Bytes,
    /// Label of each call-data byte; missing entries are SAFE
    pub input_taint: Vec<TaintLabel>,
    /// Gas limit
    pub gas: u64,
    /// Whether state modifications are forbidden
    pub is_static: bool,
    /// Call depth (0 for the outermost frame)
    pub depth: usize,
}

impl CallContext {
    /// Create a top-level call context
    pub fn new(address: Address, caller: Address, value: Word, input: Bytes, gas: u64) -> Self {
        Self {
            address,
            code_address: address,
            caller,
            value,
            input,
            input_taint: Vec::new(),
            gas,
            is_static: false,
            depth: 0,
        }
    }

    /// Create a static call context
    pub fn new_static(address: Address, caller: Address, input: Bytes, gas: u64) -> Self {
        Self {
            is_static: true,
            ..Self::new(address, caller, Word::zero(), input, gas)
        }
    }

    /// Label of call-data byte `index`
    pub fn input_label(&self, index: usize) -> TaintLabel {
        self.input_taint
            .get(index)
            .copied()
            .unwrap_or(TaintLabel::SAFE)
    }

    /// OR of the labels of call-data bytes `[offset, offset + size)`
    pub fn input_labels(&self, offset: usize, size: usize) -> TaintLabel {
        if offset >= self.input_taint.len() {
            return TaintLabel::SAFE;
        }
        let end = offset.saturating_add(size).min(self.input_taint.len());
        TaintLabel::join_all(&self.input_taint[offset..end])
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(Address::ZERO, Address::ZERO, Word::zero(), Bytes::new(), 0)
    }
}

/// Code executed by a frame together with its context
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Call parameters
    pub context: CallContext,
    /// Bytecode
    pub code: Bytes,
    /// Keccak-256 of `code`, the key for jump destination analysis
    pub code_hash: H256,
}

impl CallFrame {
    /// Create a frame, hashing the code
    pub fn new(context: CallContext, code: Bytes) -> Self {
        let code_hash = keccak256(&code);
        Self::with_hash(context, code, code_hash)
    }

    /// Create a frame with an already known code hash
    pub fn with_hash(context: CallContext, code: Bytes, code_hash: H256) -> Self {
        Self {
            context,
            code,
            code_hash,
        }
    }
}

/// Block environment information
#[derive(Clone, Debug)]
pub struct BlockContext {
    /// Block number
    pub number: u64,
    /// Block timestamp
    pub timestamp: u64,
    /// Block gas limit
    pub gas_limit: u64,
    /// Block coinbase
    pub coinbase: Address,
    /// Block difficulty
    pub difficulty: Word,
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            number: 0,
            timestamp: 0,
            gas_limit: 8_000_000,
            coinbase: Address::ZERO,
            difficulty: Word::zero(),
        }
    }
}

/// Transaction environment information
#[derive(Clone, Debug, Default)]
pub struct TxContext {
    /// Transaction origin
    pub origin: Address,
    /// Gas price
    pub gas_price: Word,
}
