//! Outbound telemetry
//!
//! The interpreter reports storage accesses and tainted branches to a
//! [`TelemetrySink`]. Sinks are fire-and-forget: `notify` never fails and
//! never blocks execution.

use flow_primitives::{Address, TaintLabel, Word};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{SyncSender, TrySendError};

/// Event observed during execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryEvent {
    /// SLOAD of `slot` in `address`
    StorageRead {
        /// Account
        address: Address,
        /// Slot key
        slot: Word,
    },
    /// SSTORE to `slot` in `address`
    StorageWrite {
        /// Account
        address: Address,
        /// Slot key
        slot: Word,
    },
    /// JUMPI whose condition carries taint
    TaintedBranch {
        /// Condition label
        label: TaintLabel,
    },
}

impl fmt::Display for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEvent::StorageRead { address, slot } => {
                write!(f, "sload:{}:{:#x}", address, slot)
            }
            TelemetryEvent::StorageWrite { address, slot } => {
                write!(f, "sstore:{}:{:#x}", address, slot)
            }
            TelemetryEvent::TaintedBranch { label } => write!(f, "taint:{}", label.bits()),
        }
    }
}

/// Receiver of telemetry events
pub trait TelemetrySink: Send + Sync {
    /// Deliver an event; must not block
    fn notify(&self, event: &TelemetryEvent);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn notify(&self, _event: &TelemetryEvent) {}
}

/// Sink that emits each event as a `debug!` record
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn notify(&self, event: &TelemetryEvent) {
        tracing::debug!(target: "flow_evm::telemetry", "{}", event);
    }
}

/// Sink that forwards the string encoding over a bounded channel.
///
/// Events are dropped when the channel is full or disconnected.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Mutex<SyncSender<String>>,
    dropped: AtomicU64,
}

impl ChannelSink {
    /// Wrap the sending half of a `sync_channel`
    pub fn new(sender: SyncSender<String>) -> Self {
        Self {
            sender: Mutex::new(sender),
            dropped: AtomicU64::new(0),
        }
    }

    /// Number of events that could not be delivered
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl TelemetrySink for ChannelSink {
    fn notify(&self, event: &TelemetryEvent) {
        match self.sender.lock().try_send(event.to_string()) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) | Err(TrySendError::Disconnected(msg)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Dropped telemetry event {}", msg);
            }
        }
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingSink {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events seen so far
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }

    /// Encoded form of the events seen so far
    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(ToString::to_string).collect()
    }
}

impl TelemetrySink for RecordingSink {
    fn notify(&self, event: &TelemetryEvent) {
        self.events.lock().push(*event);
    }
}
