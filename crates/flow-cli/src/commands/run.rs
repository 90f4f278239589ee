//! `flowevm run`: execute code once and report its taint verdict

use clap::Args;
use flow_evm::{ExecutionResult, JsonTracer};
use flow_primitives::Word;

use super::{parse_hex, parse_value, Session};
use crate::{config::Config, output::Output, CliError};

/// Arguments of `flowevm run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Runtime bytecode (hex)
    #[arg(long)]
    pub code: String,
    /// Call data (hex)
    #[arg(long, default_value = "")]
    pub input: String,
    /// Call value (hex with 0x, or decimal)
    #[arg(long, default_value = "0")]
    pub value: String,
    /// Gas limit, overriding the config
    #[arg(long)]
    pub gas: Option<u64>,
}

impl RunArgs {
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let session = Session::new(config, parse_hex(&self.code)?, self.gas)?;
        let input = parse_hex(&self.input)?;
        let value = parse_value(&self.value)?;

        if json {
            // Step records and the summary stream straight to stdout
            let tracer = JsonTracer::new(std::io::stdout());
            session.execute(&input, value, Some(Box::new(tracer)))?;
        } else {
            let result = session.execute(&input, value, None)?;
            report(&result, value).print();
        }
        Ok(())
    }
}

/// Human-readable report; the verdict is always the last line
fn report(result: &ExecutionResult, value: Word) -> Output {
    let mut out = Output::new(false)
        .line(format!("output: 0x{}", hex::encode(&result.output)))
        .line(format!("gas used: {}", result.gas_used()))
        .line(format!("status: {}", result.status));
    if let Some(error) = &result.error {
        out = out.line(format!("error: {}", error));
    }
    if !value.is_zero() {
        out = out.line(format!("value: {:#x}", value));
    }
    out.line(format!("taint: {}", result.verdict()))
}
