use cueline_alignment::HighlightFrame;
use cueline_capture::CaptureState;

/// Host surface the engine renders into. A desktop shell forwards these to
/// its window; tests record them.
pub trait PrompterRuntime: Send + 'static {
    /// A new highlight snapshot. Emitted whenever the display would change:
    /// pointer movement, partial/final transcript updates, script edits.
    fn emit_frame(&self, frame: HighlightFrame);

    /// Capture lifecycle change, with an error description for faults.
    fn emit_capture_state(&self, state: CaptureState, error: Option<String>);

    /// Human-readable notice, e.g. capture being unavailable on this
    /// platform.
    fn emit_notice(&self, message: String);
}
