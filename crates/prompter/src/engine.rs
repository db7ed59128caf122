use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use cueline_alignment::{AlignConfig, AlignmentSession};
use cueline_capture::{CaptureEvent, CaptureSink, CaptureSupervisor, SpeechCapture, StartOutcome};

use crate::runtime::PrompterRuntime;

/// Control-plane commands for a running engine.
#[derive(Debug)]
pub enum Command {
    /// Begin speech capture. A notice is emitted instead when the backend
    /// is unsupported.
    Start,
    /// Stop speech capture; alignment state is kept.
    Stop,
    /// Return the pointer to the top of the script and drop spoken history.
    Reset,
    /// Replace the script text; implies a reset.
    SetScript(String),
    /// Stop capture and exit the engine task.
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Idle-monitor cadence. Coarser than the alignment timeout on purpose:
    /// the tick only has to notice staleness, not measure it.
    pub tick: Duration,
    pub align: AlignConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            align: AlignConfig::default(),
        }
    }
}

/// Handle to a spawned engine task. Dropping it does not stop the engine;
/// call [`PrompterHandle::shutdown`] (or cancel the token) for teardown.
pub struct PrompterHandle {
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl PrompterHandle {
    pub fn start(&self) {
        let _ = self.commands.send(Command::Start);
    }

    pub fn stop(&self) {
        let _ = self.commands.send(Command::Stop);
    }

    pub fn reset(&self) {
        let _ = self.commands.send(Command::Reset);
    }

    pub fn set_script(&self, text: impl Into<String>) {
        let _ = self.commands.send(Command::SetScript(text.into()));
    }

    /// Token for hard-cancelling the engine from outside, e.g. on app exit.
    /// Pending commands may be dropped; capture teardown still runs.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Graceful teardown: queued commands are processed first, then capture
    /// is stopped and the task exits.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        let _ = self.task.await;
    }
}

/// Spawn the engine onto the current tokio runtime.
///
/// One task owns everything: the alignment session, the capture supervisor
/// and the idle ticker. All input funnels through one `select`, so there is
/// no locking around session state.
pub fn spawn<B, R>(script: &str, backend: B, runtime: R, config: EngineConfig) -> PrompterHandle
where
    B: SpeechCapture + 'static,
    R: PrompterRuntime,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let (sink, slot, events) = CaptureSink::channel();
    let engine = Engine {
        session: AlignmentSession::with_config(
            script,
            config.align.clone(),
            tokio::time::Instant::now().into_std(),
        ),
        supervisor: CaptureSupervisor::new(backend, sink),
        runtime,
        tick: config.tick,
        cancel: cancel.clone(),
    };

    let task = tokio::spawn(engine.run(rx, slot, events));
    PrompterHandle {
        commands: tx,
        cancel,
        task,
    }
}

struct Engine<B: SpeechCapture, R: PrompterRuntime> {
    session: AlignmentSession,
    supervisor: CaptureSupervisor<B>,
    runtime: R,
    tick: Duration,
    cancel: CancellationToken,
}

impl<B: SpeechCapture, R: PrompterRuntime> Engine<B, R> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        slot: std::sync::Arc<cueline_capture::PartialSlot>,
        mut events: mpsc::UnboundedReceiver<CaptureEvent>,
    ) {
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let cancel = self.cancel.clone();

        self.runtime.emit_frame(self.session.frame());
        tracing::info!("prompter_engine_started");

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                cmd = commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },

                Some(event) = events.recv() => self.handle_event(event),

                text = slot.take() => {
                    self.session
                        .apply_partial(&text, tokio::time::Instant::now().into_std());
                    // the partial itself is part of the display, so a frame
                    // goes out even when the pointer held
                    self.runtime.emit_frame(self.session.frame());
                }

                _ = ticker.tick() => {
                    if self.session.tick(tokio::time::Instant::now().into_std()) {
                        self.runtime.emit_frame(self.session.frame());
                    }
                }
            }
        }

        self.supervisor.shutdown();
        tracing::info!("prompter_engine_stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start => match self.supervisor.start() {
                StartOutcome::Unsupported => self.runtime.emit_notice(
                    "speech capture is not available on this platform".into(),
                ),
                // a runtime failure already rides the State { Stopped, error }
                // event; only capability absence gets the notice
                StartOutcome::Started | StartOutcome::Failed => {}
            },
            Command::Stop => self.supervisor.stop(),
            Command::Reset => {
                self.session.reset(tokio::time::Instant::now().into_std());
                self.runtime.emit_frame(self.session.frame());
            }
            Command::SetScript(text) => {
                self.session
                    .set_script(&text, tokio::time::Instant::now().into_std());
                self.runtime.emit_frame(self.session.frame());
            }
            Command::Shutdown => unreachable!("handled in the select loop"),
        }
    }

    fn handle_event(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Final { text } => {
                self.session
                    .apply_final(&text, tokio::time::Instant::now().into_std());
                self.runtime.emit_frame(self.session.frame());
            }
            CaptureEvent::Ended => self.supervisor.on_backend_ended(),
            CaptureEvent::State { state, error } => {
                self.runtime.emit_capture_state(state, error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use cueline_alignment::HighlightFrame;
    use cueline_capture::{CaptureState, MockCapture, Unavailable};

    const SCRIPT: &str = "나는 오늘 날씨가 좋다고 생각한다";

    #[derive(Clone, Default)]
    struct Recorder {
        frames: Arc<Mutex<Vec<HighlightFrame>>>,
        states: Arc<Mutex<Vec<CaptureState>>>,
        notices: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn frames(&self) -> Vec<HighlightFrame> {
            self.frames.lock().unwrap().clone()
        }

        fn states(&self) -> Vec<CaptureState> {
            self.states.lock().unwrap().clone()
        }

        fn notices(&self) -> Vec<String> {
            self.notices.lock().unwrap().clone()
        }
    }

    impl PrompterRuntime for Recorder {
        fn emit_frame(&self, frame: HighlightFrame) {
            self.frames.lock().unwrap().push(frame);
        }

        fn emit_capture_state(&self, state: CaptureState, _error: Option<String>) {
            self.states.lock().unwrap().push(state);
        }

        fn emit_notice(&self, message: String) {
            self.notices.lock().unwrap().push(message);
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn final_transcript_advances_the_frame() {
        let (backend, stats) = MockCapture::new();
        let rec = Recorder::default();
        let handle = spawn(SCRIPT, backend, rec.clone(), EngineConfig::default());

        handle.start();
        settle().await;
        stats.sink().unwrap().finalized("오늘 날씨가 좋다고");
        settle().await;
        handle.shutdown().await;

        let frames = rec.frames();
        let last = frames.last().unwrap();
        // 4 of 5 tokens confirmed
        assert_eq!(last.progress_percent, 80);
        assert_eq!(last.final_history, ["오늘 날씨가 좋다고"]);
        // teardown happens after the loop, so only Running reaches the shell
        assert_eq!(rec.states(), [CaptureState::Running]);
    }

    #[tokio::test(start_paused = true)]
    async fn partial_updates_emit_frames_even_without_movement() {
        let (backend, stats) = MockCapture::new();
        let rec = Recorder::default();
        let handle = spawn(SCRIPT, backend, rec.clone(), EngineConfig::default());

        handle.start();
        settle().await;
        stats.sink().unwrap().partial("웅얼웅얼");
        settle().await;
        handle.shutdown().await;

        let frames = rec.frames();
        let last = frames.last().unwrap();
        assert_eq!(last.partial_text, "웅얼웅얼");
        assert_eq!(last.progress_percent, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_speech_slides_after_the_timeout() {
        let (backend, stats) = MockCapture::new();
        let rec = Recorder::default();
        let handle = spawn(SCRIPT, backend, rec.clone(), EngineConfig::default());

        handle.start();
        settle().await;
        stats.sink().unwrap().partial("웅얼웅얼");
        settle().await;
        // past the idle timeout but clear of the next tick boundary
        tokio::time::sleep(Duration::from_millis(1100)).await;
        handle.shutdown().await;

        let last = rec.frames().last().unwrap().clone();
        // one forced slide: 1 of 5 tokens
        assert_eq!(last.progress_percent, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn set_script_resets_progress() {
        let (backend, stats) = MockCapture::new();
        let rec = Recorder::default();
        let handle = spawn(SCRIPT, backend, rec.clone(), EngineConfig::default());

        handle.start();
        settle().await;
        stats.sink().unwrap().finalized("오늘 날씨가 좋다고");
        settle().await;
        handle.set_script("완전히 새로운 원고");
        settle().await;
        handle.shutdown().await;

        let last = rec.frames().last().unwrap().clone();
        assert_eq!(last.progress_percent, 0);
        assert!(last.final_history.is_empty());
        assert!(last.current_text.starts_with("완전히"));
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_backend_surfaces_a_notice() {
        let rec = Recorder::default();
        let handle = spawn(SCRIPT, Unavailable, rec.clone(), EngineConfig::default());

        handle.start();
        settle().await;
        handle.shutdown().await;

        assert_eq!(rec.notices().len(), 1);
        assert!(rec.states().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_start_reports_state_not_capability_notice() {
        let (backend, stats) = MockCapture::new();
        let rec = Recorder::default();
        let handle = spawn(SCRIPT, backend, rec.clone(), EngineConfig::default());

        stats.fail_next_start();
        handle.start();
        settle().await;
        handle.shutdown().await;

        assert!(rec.notices().is_empty());
        assert_eq!(rec.states(), [CaptureState::Stopped]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent_through_the_engine() {
        let (backend, stats) = MockCapture::new();
        let rec = Recorder::default();
        let handle = spawn(SCRIPT, backend, rec.clone(), EngineConfig::default());

        handle.start();
        handle.start();
        settle().await;
        handle.shutdown().await;

        assert_eq!(stats.starts(), 1);
        assert_eq!(stats.stops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_without_start_stops_cleanly() {
        let (backend, stats) = MockCapture::new();
        let rec = Recorder::default();
        let handle = spawn(SCRIPT, backend, rec.clone(), EngineConfig::default());

        settle().await;
        handle.shutdown().await;

        assert_eq!(stats.starts(), 0);
        // teardown always stops the backend, started or not
        assert_eq!(stats.stops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spontaneous_end_restarts_capture() {
        let (backend, stats) = MockCapture::new();
        let rec = Recorder::default();
        let handle = spawn(SCRIPT, backend, rec.clone(), EngineConfig::default());

        handle.start();
        settle().await;
        stats.simulate_ended();
        settle().await;
        handle.shutdown().await;

        assert_eq!(stats.starts(), 2);
        assert_eq!(
            rec.states(),
            [
                CaptureState::Running,
                CaptureState::Restarting,
                CaptureState::Running
            ]
        );
    }
}
