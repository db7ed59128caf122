use crate::state::CaptureState;
use crate::{CaptureSink, SpeechCapture};

/// What a start request amounted to. Capability absence and a runtime start
/// failure are different conditions: the first gets a user-visible notice,
/// the second is reported through a `State { Stopped, error }` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    Unsupported,
    Failed,
}

/// Keeps a capture backend in the state the caller asked for.
///
/// Tracks desired-running separately from the actual [`CaptureState`], so a
/// backend that terminates on its own while still wanted gets a best-effort
/// restart. The restart swallows its own failure: it is logged and surfaced
/// as a `State { Stopped, error }` notification, never propagated.
pub struct CaptureSupervisor<B> {
    backend: B,
    sink: CaptureSink,
    state: CaptureState,
    desired_running: bool,
}

impl<B: SpeechCapture> CaptureSupervisor<B> {
    pub fn new(backend: B, sink: CaptureSink) -> Self {
        Self {
            backend,
            sink,
            state: CaptureState::Idle,
            desired_running: false,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn supported(&self) -> bool {
        self.backend.supported()
    }

    /// Start capture. Idempotent: a start while running is a no-op.
    pub fn start(&mut self) -> StartOutcome {
        if !self.backend.supported() {
            tracing::info!("capture_unsupported");
            return StartOutcome::Unsupported;
        }
        if self.desired_running {
            return StartOutcome::Started;
        }
        self.desired_running = true;
        match self.backend.start(self.sink.clone()) {
            Ok(()) => {
                self.transition(CaptureState::Running, None);
                StartOutcome::Started
            }
            Err(err) => {
                self.desired_running = false;
                self.transition(CaptureState::Stopped, Some(err.to_string()));
                StartOutcome::Failed
            }
        }
    }

    /// Stop capture. Idempotent: a stop while stopped is a no-op.
    pub fn stop(&mut self) {
        if !self.desired_running && !self.state.is_running() {
            return;
        }
        self.desired_running = false;
        self.backend.stop();
        self.transition(CaptureState::Stopped, None);
    }

    /// Handle a spontaneous backend termination. While still
    /// desired-running this restarts the backend; otherwise it is the tail
    /// end of a requested stop and nothing happens.
    pub fn on_backend_ended(&mut self) {
        if !self.desired_running {
            return;
        }
        self.transition(CaptureState::Restarting, None);
        match self.backend.start(self.sink.clone()) {
            Ok(()) => self.transition(CaptureState::Running, None),
            Err(err) => {
                tracing::warn!(error = %err, "capture_restart_failed");
                self.desired_running = false;
                self.transition(CaptureState::Stopped, Some(err.to_string()));
            }
        }
    }

    /// Teardown: stop the backend regardless of how we got here. Safe to
    /// call even if start was never invoked.
    pub fn shutdown(&mut self) {
        self.desired_running = false;
        self.backend.stop();
        if self.state != CaptureState::Stopped {
            self.transition(CaptureState::Stopped, None);
        }
    }

    fn transition(&mut self, next: CaptureState, error: Option<String>) {
        // a same-state notification carries a fault description without
        // being a transition
        if self.state != next {
            debug_assert!(
                self.state.can_transition(next),
                "illegal capture transition {:?} -> {next:?}",
                self.state
            );
            self.state = next;
        }
        self.sink.state(next, error);
    }
}
