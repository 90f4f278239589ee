//! Subcommands and the execution session they share

pub mod analyze;
pub mod config;
pub mod run;

use crate::{config::Config, CliError};
use bytes::Bytes;
use flow_evm::{
    CallContext, Evm, EvmConfig, ExecutionResult, InMemoryState, StateStore, Tracer,
    TxContext,
};
use flow_primitives::{word::parse_word, Address, Word};

/// Decode a hex string with or without `0x`
pub fn parse_hex(s: &str) -> Result<Vec<u8>, CliError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(s)?)
}

/// Parse a call value given in hex (`0x`) or decimal
pub fn parse_value(s: &str) -> Result<Word, CliError> {
    parse_word(s).map_err(|e| CliError::InvalidValue(e.to_string()))
}

/// Native stack for an execution thread, enough for nested frames up to the
/// 1024 call depth limit in unoptimized builds
const EXECUTION_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Everything needed to run one piece of code repeatedly
pub struct Session {
    code: Bytes,
    address: Address,
    caller: Address,
    gas: u64,
    evm_config: EvmConfig,
}

impl Session {
    /// Build a session from the config; `gas` overrides the configured limit
    pub fn new(config: &Config, code: Vec<u8>, gas: Option<u64>) -> Result<Self, CliError> {
        let evm_config = EvmConfig::for_fork(config.fork()?)
            .with_overflow_tracking(config.track_overflow);
        Ok(Self {
            code: Bytes::from(code),
            address: config.address()?,
            caller: config.caller()?,
            gas: gas.unwrap_or(config.gas_limit),
            evm_config,
        })
    }

    /// Run the code on a fresh state with a fully funded caller.
    ///
    /// Nested calls recurse natively, so the run happens on its own thread
    /// with a large stack.
    pub fn execute(
        &self,
        input: &[u8],
        value: Word,
        tracer: Option<Box<dyn Tracer + Send>>,
    ) -> Result<ExecutionResult, CliError> {
        std::thread::scope(|scope| {
            let handle = std::thread::Builder::new()
                .name("flowevm-exec".to_string())
                .stack_size(EXECUTION_STACK_SIZE)
                .spawn_scoped(scope, || self.execute_here(input, value, tracer))?;
            match handle.join() {
                Ok(result) => Ok(result),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        })
    }

    fn execute_here(
        &self,
        input: &[u8],
        value: Word,
        tracer: Option<Box<dyn Tracer + Send>>,
    ) -> ExecutionResult {
        let mut state = InMemoryState::new();
        state.set_code(&self.address, self.code.clone());
        state.set_balance(self.caller, Word::MAX);

        let tx = TxContext {
            origin: self.caller,
            gas_price: Word::zero(),
        };
        let mut evm = Evm::new(&mut state)
            .with_config(self.evm_config.clone())
            .with_tx(tx);
        if let Some(tracer) = tracer {
            evm = evm.with_tracer(tracer);
        }

        let ctx = CallContext::new(
            self.address,
            self.caller,
            value,
            Bytes::copy_from_slice(input),
            self.gas,
        );
        evm.call(ctx)
    }
}
