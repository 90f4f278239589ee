//! Step tracing

use crate::result::ExecutionResult;
use serde::Serialize;
use std::io::Write;

/// State of the interpreter just before an instruction executes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Program counter
    pub pc: usize,
    /// Opcode byte
    pub op: u8,
    /// Opcode mnemonic
    pub op_name: &'static str,
    /// Gas available before the instruction
    pub gas: u64,
    /// Static gas of the instruction
    pub gas_cost: u64,
    /// Call depth
    pub depth: usize,
    /// Stack depth
    pub stack: usize,
    /// Memory size in bytes
    pub mem_size: usize,
    /// Label of the top stack item, 0 when the stack is empty
    pub taint: u64,
}

/// Observer of an execution
pub trait Tracer {
    /// Called before every instruction in every frame
    fn step(&mut self, record: &StepRecord);

    /// Called once with the outermost frame's result
    fn finish(&mut self, result: &ExecutionResult);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    output: String,
    gas_used: u64,
    status: &'a str,
    taint: u64,
    verdict: &'a str,
}

/// Tracer writing one JSON object per line
pub struct JsonTracer<W: Write> {
    out: W,
}

impl<W: Write> JsonTracer<W> {
    /// Trace into `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line<T: Serialize>(&mut self, value: &T) {
        let written = serde_json::to_writer(&mut self.out, value)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(e) = written {
            tracing::warn!("Failed to write trace line: {}", e);
        }
    }
}

impl<W: Write> Tracer for JsonTracer<W> {
    fn step(&mut self, record: &StepRecord) {
        self.write_line(record);
    }

    fn finish(&mut self, result: &ExecutionResult) {
        let status = result.status.to_string();
        let summary = Summary {
            output: format!("0x{}", hex::encode(&result.output)),
            gas_used: result.gas_used(),
            status: &status,
            taint: result.taint_signal.bits(),
            verdict: result.verdict().as_str(),
        };
        self.write_line(&summary);
        if let Err(e) = self.out.flush() {
            tracing::warn!("Failed to flush tracer: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Status;
    use flow_primitives::TaintLabel;

    #[test]
    fn test_step_record_json() {
        let record = StepRecord {
            pc: 2,
            op: 0x01,
            op_name: "ADD",
            gas: 100,
            gas_cost: 3,
            depth: 0,
            stack: 2,
            mem_size: 0,
            taint: 1,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["opName"], "ADD");
        assert_eq!(json["gasCost"], 3);
        assert_eq!(json["memSize"], 0);
    }

    #[test]
    fn test_json_tracer_lines() {
        let mut tracer = JsonTracer::new(Vec::new());
        tracer.step(&StepRecord {
            pc: 0,
            op: 0x00,
            op_name: "STOP",
            gas: 10,
            gas_cost: 0,
            depth: 0,
            stack: 0,
            mem_size: 0,
            taint: 0,
        });
        let result = ExecutionResult::success(
            Status::Returned,
            10,
            4,
            vec![0xab],
            vec![TaintLabel::param(0)],
        )
        .with_signals(TaintLabel::param(0), TaintLabel::SAFE);
        tracer.finish(&result);

        let text = String::from_utf8(tracer.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let summary: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(summary["output"], "0xab");
        assert_eq!(summary["gasUsed"], 6);
        assert_eq!(summary["status"], "returned");
        assert_eq!(summary["taint"], 1);
        assert_eq!(summary["verdict"], "safe");
    }
}
