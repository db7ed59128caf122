pub mod coalesce;
pub mod mock;
pub mod state;
pub mod supervisor;

use std::sync::Arc;

use tokio::sync::mpsc;

pub use coalesce::PartialSlot;
pub use mock::{MockCapture, MockStats, Unavailable};
pub use state::CaptureState;
pub use supervisor::{CaptureSupervisor, StartOutcome};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("speech capture is not supported on this platform")]
    Unsupported,
    #[error("capture backend failed: {0}")]
    Backend(String),
}

/// Lifecycle events delivered by a capture backend. Partial transcripts do
/// not appear here; they ride the coalescing [`PartialSlot`], so a burst of
/// partials collapses to the latest value instead of queueing.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum CaptureEvent {
    /// One confirmed utterance. Appended to history by the consumer.
    #[serde(rename = "final")]
    Final { text: String },
    /// The backend terminated on its own, without a stop request. The
    /// supervisor decides whether to restart.
    #[serde(rename = "ended")]
    Ended,
    /// State change, with an error description for runtime faults
    /// (permission denial, connectivity loss). Faults are reported here,
    /// never raised into the engine.
    #[serde(rename = "state")]
    State {
        state: CaptureState,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Where a backend delivers its output: partials into the slot, everything
/// else into the event channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CaptureSink {
    slot: Arc<PartialSlot>,
    events: mpsc::UnboundedSender<CaptureEvent>,
}

impl CaptureSink {
    /// Create a sink plus the consumer ends: the coalescing slot and the
    /// event receiver.
    pub fn channel() -> (Self, Arc<PartialSlot>, mpsc::UnboundedReceiver<CaptureEvent>) {
        let slot = Arc::new(PartialSlot::new());
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                slot: slot.clone(),
                events: tx,
            },
            slot,
            rx,
        )
    }

    /// Replace (not append) the current partial transcript.
    pub fn partial(&self, text: impl Into<String>) {
        self.slot.publish(text.into());
    }

    /// Deliver one confirmed utterance.
    pub fn finalized(&self, text: impl Into<String>) {
        let _ = self.events.send(CaptureEvent::Final { text: text.into() });
    }

    /// Signal that the backend terminated on its own.
    pub fn ended(&self) {
        let _ = self.events.send(CaptureEvent::Ended);
    }

    pub fn state(&self, state: CaptureState, error: Option<String>) {
        let _ = self.events.send(CaptureEvent::State { state, error });
    }
}

/// Capability provider for live speech capture.
///
/// Implementations push output through the [`CaptureSink`] handed to
/// `start`. `start` and `stop` must be idempotent: starting while running
/// and stopping while stopped are no-ops.
pub trait SpeechCapture: Send {
    /// Whether this provider can actually capture in the current
    /// environment. When `false`, `start` is never called; the engine
    /// surfaces a notice instead.
    fn supported(&self) -> bool;

    fn start(&mut self, sink: CaptureSink) -> Result<(), Error>;

    fn stop(&mut self);
}
