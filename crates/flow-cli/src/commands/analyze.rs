//! `flowevm analyze`: decide whether a potential overflow can be triggered
//!
//! A first run with the given input settles safe, overflow and protected
//! overflow outright. A potential overflow is retried with the largest call
//! value, then with every all-zero/all-ones assignment of the ABI arguments.

use clap::Args;
use flow_evm::Verdict;
use flow_primitives::Word;
use serde::Serialize;
use serde_json::json;
use std::fmt;

use super::{parse_hex, Session};
use crate::{config::Config, output::Output, CliError};

const SELECTOR_LEN: usize = 4;
const ARG_LEN: usize = 32;

/// Arguments of `flowevm analyze`
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Runtime bytecode (hex)
    #[arg(long)]
    pub code: String,
    /// Call data: 4-byte selector followed by 32-byte arguments (hex)
    #[arg(long, default_value = "")]
    pub input: String,
    /// Gas limit, overriding the config
    #[arg(long)]
    pub gas: Option<u64>,
}

/// One execution made by the analyzer
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    /// Run identifier: a number, or `0 with value`
    pub id: String,
    /// Call data used
    pub input: String,
    /// Verdict of the run
    pub verdict: Verdict,
}

/// Final answer of the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    /// First run was clean
    Safe,
    /// First run overflowed
    Overflow,
    /// First run only had guarded overflow
    ProtectedOverflow,
    /// A retry turned the potential overflow into a real one
    Triggered,
    /// No retry overflowed
    NotTriggered,
}

impl Conclusion {
    /// Whether an overflow was observed
    pub fn is_overflow(self) -> bool {
        matches!(self, Conclusion::Overflow | Conclusion::Triggered)
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Conclusion::Safe => "safe",
            Conclusion::Overflow => "overflow",
            Conclusion::ProtectedOverflow => "protected overflow",
            Conclusion::Triggered => "potential overflow triggered",
            Conclusion::NotTriggered => "potential overflow not triggered",
        })
    }
}

/// Call data variants tried after a potential overflow
///
/// Arguments are counted from the input length, capped at `max_args`; bit
/// `i` of the variant index selects all-ones for argument `i`.
pub fn argument_variants(input: &[u8], max_args: usize) -> Vec<Vec<u8>> {
    let selector = &input[..input.len().min(SELECTOR_LEN)];
    let args = (input.len().saturating_sub(SELECTOR_LEN) / ARG_LEN).min(max_args);
    let Some(count) = 1usize.checked_shl(args as u32) else {
        return Vec::new();
    };

    (0..count)
        .map(|variant| {
            let mut data = selector.to_vec();
            for arg in 0..args {
                let fill = if (variant >> arg) & 1 == 1 { 0xff } else { 0x00 };
                data.extend_from_slice(&[fill; ARG_LEN]);
            }
            data
        })
        .collect()
}

/// Run the retry strategy over `input`
pub fn analyze(
    session: &Session,
    input: &[u8],
    max_args: usize,
) -> Result<(Vec<Attempt>, Conclusion), CliError> {
    let mut attempts = Vec::new();
    let mut attempt = |id: String, input: &[u8], value: Word| -> Result<Verdict, CliError> {
        let verdict = session.execute(input, value, None)?.verdict();
        tracing::debug!("Run {} verdict={}", id, verdict);
        attempts.push(Attempt {
            id,
            input: format!("0x{}", hex::encode(input)),
            verdict,
        });
        Ok(verdict)
    };

    let conclusion = match attempt("0".to_string(), input, Word::zero())? {
        Verdict::Safe => Conclusion::Safe,
        Verdict::Overflow => Conclusion::Overflow,
        Verdict::ProtectedOverflow => Conclusion::ProtectedOverflow,
        Verdict::PotentialOverflow => {
            let mut conclusion = Conclusion::NotTriggered;
            if attempt("0 with value".to_string(), input, Word::MAX)? == Verdict::Overflow {
                conclusion = Conclusion::Triggered;
            } else {
                for (i, data) in argument_variants(input, max_args).iter().enumerate() {
                    if attempt((i + 1).to_string(), data, Word::zero())? == Verdict::Overflow {
                        conclusion = Conclusion::Triggered;
                        break;
                    }
                }
            }
            conclusion
        }
    };
    Ok((attempts, conclusion))
}

impl AnalyzeArgs {
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let session = Session::new(config, parse_hex(&self.code)?, self.gas)?;
        let input = parse_hex(&self.input)?;
        let (attempts, conclusion) = analyze(&session, &input, config.max_retry_args)?;

        let mut out = Output::new(json)
            .field_value("attempts", json!(attempts))
            .field("result", &conclusion.to_string())
            .field_bool("overflow", conclusion.is_overflow());
        for attempt in &attempts {
            out = out.line(format!(
                "[run {}] input: {} result: {}",
                attempt.id, attempt.input, attempt.verdict
            ));
        }
        out.line(format!("taint: {}", conclusion)).print();
        Ok(())
    }
}
