use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{CaptureSink, Error, SpeechCapture};

/// Shared handle for driving and asserting on a [`MockCapture`] from
/// outside the engine that owns it.
#[derive(Debug, Clone, Default)]
pub struct MockStats {
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
    running: Arc<AtomicBool>,
    fail_next_start: Arc<AtomicBool>,
    sink: Arc<Mutex<Option<CaptureSink>>>,
}

impl MockStats {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Make the next `start` call fail, e.g. to exercise the restart path.
    pub fn fail_next_start(&self) {
        self.fail_next_start.store(true, Ordering::SeqCst);
    }

    /// Sink handed to the most recent `start`, for scripting events.
    pub fn sink(&self) -> Option<CaptureSink> {
        self.sink.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Simulate the backend dying on its own: capture stops and an `Ended`
    /// event is emitted, as a real provider would on spontaneous
    /// termination.
    pub fn simulate_ended(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(sink) = self.sink() {
            sink.ended();
        }
    }
}

/// Scripted capture provider for tests and replay tooling: records
/// start/stop calls and exposes the sink so the test drives partials and
/// finals by hand.
#[derive(Debug, Default)]
pub struct MockCapture {
    stats: MockStats,
}

impl MockCapture {
    pub fn new() -> (Self, MockStats) {
        let stats = MockStats::default();
        (
            Self {
                stats: stats.clone(),
            },
            stats,
        )
    }
}

impl SpeechCapture for MockCapture {
    fn supported(&self) -> bool {
        true
    }

    fn start(&mut self, sink: CaptureSink) -> Result<(), Error> {
        if self.stats.is_running() {
            return Ok(());
        }
        if self.stats.fail_next_start.swap(false, Ordering::SeqCst) {
            return Err(Error::Backend("scripted start failure".into()));
        }
        self.stats.running.store(true, Ordering::SeqCst);
        self.stats.starts.fetch_add(1, Ordering::SeqCst);
        *self.stats.sink.lock().unwrap_or_else(|e| e.into_inner()) = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        self.stats.running.store(false, Ordering::SeqCst);
        self.stats.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Capability-absent provider: `supported()` is `false` and `start` refuses.
/// The engine turns this into a user-visible notice instead of an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl SpeechCapture for Unavailable {
    fn supported(&self) -> bool {
        false
    }

    fn start(&mut self, _sink: CaptureSink) -> Result<(), Error> {
        Err(Error::Unsupported)
    }

    fn stop(&mut self) {}
}
