/// Lifecycle of a capture provider. Every transition goes through the
/// table; "running" is never inferred from side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, specta::Type)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    /// Never started.
    Idle,
    /// Actively capturing.
    Running,
    /// Ended unexpectedly while still wanted; a restart is in flight.
    Restarting,
    /// Stopped, either on request or after a failed restart.
    Stopped,
}

impl CaptureState {
    /// Transition table. Self-transitions are intentionally absent: starting
    /// while running and stopping while stopped are caller-level no-ops, not
    /// state changes.
    pub fn can_transition(self, next: CaptureState) -> bool {
        use CaptureState::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Idle, Stopped)
                | (Running, Restarting)
                | (Running, Stopped)
                | (Restarting, Running)
                | (Restarting, Stopped)
                | (Stopped, Running)
        )
    }

    pub fn is_running(self) -> bool {
        matches!(self, CaptureState::Running | CaptureState::Restarting)
    }
}
