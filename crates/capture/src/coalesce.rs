use std::sync::Mutex;

use tokio::sync::Notify;

/// Single-slot coalescing delivery for partial transcripts.
///
/// Recognition backends can emit partial updates faster than the engine
/// cares to process them. Each `publish` replaces any pending value and
/// wakes the consumer, so the consumer sees at most one partial per
/// scheduling tick, always the latest. A queue here would only buffer
/// stale text.
#[derive(Debug, Default)]
pub struct PartialSlot {
    pending: Mutex<Option<String>>,
    notify: Notify,
}

impl PartialSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending partial and wake the consumer.
    pub fn publish(&self, text: String) {
        // lock is never held across an await
        *self.pending.lock().unwrap_or_else(|e| e.into_inner()) = Some(text);
        self.notify.notify_one();
    }

    /// Take the pending partial without waiting.
    pub fn try_take(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    /// Wait until a partial is pending and take it.
    pub async fn take(&self) -> String {
        loop {
            if let Some(text) = self.try_take() {
                return text;
            }
            self.notify.notified().await;
        }
    }
}
