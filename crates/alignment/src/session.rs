use std::time::Instant;

use crate::advance::{AdvanceReason, advance};
use crate::config::AlignConfig;
use crate::index::NgramIndex;
use crate::script::Script;
use crate::tail::SpokenTail;
use crate::view::{HighlightFrame, build_frame};

/// Diagnostic snapshot of session internals, intended for tooling and debug
/// panels only. Not part of the stable rendering contract.
#[derive(Debug, Clone)]
pub struct SessionDebug {
    pub pointer: usize,
    pub token_count: usize,
    pub tail_len: usize,
    pub last_reason: String,
}

/// The explicit alignment-session value: all mutable tracking state lives
/// here and is passed by reference, with no ambient process-wide state.
///
/// The pointer addresses the first script token not yet confirmed spoken. It
/// moves only through the advancer cascade ([`advance`]) or the idle slide
/// ([`AlignmentSession::tick`]), and never decreases except on explicit
/// reset. Script and index are rebuilt atomically on any script change, and
/// the index is cached here so steady-state matching cost stays bounded.
///
/// Time is injected: every mutating call takes `now` so callers (and tests)
/// own the clock.
pub struct AlignmentSession {
    script: Script,
    index: NgramIndex,
    tail: SpokenTail,
    pointer: usize,
    last_advance: Instant,
    last_reason: AdvanceReason,
    skipped: Vec<(usize, usize)>,
    config: AlignConfig,
}

impl AlignmentSession {
    pub fn new(script_text: &str, now: Instant) -> Self {
        Self::with_config(script_text, AlignConfig::default(), now)
    }

    pub fn with_config(script_text: &str, config: AlignConfig, now: Instant) -> Self {
        let script = Script::new(script_text);
        let index = NgramIndex::build(&script, config.strong_min, config.strong_max);
        Self {
            script,
            index,
            tail: SpokenTail::new(config.tail_cap),
            pointer: 0,
            last_advance: now,
            last_reason: AdvanceReason::Hold,
            skipped: Vec::new(),
            config,
        }
    }

    /// Replace the script: tokens and index are rebuilt atomically, the
    /// pointer returns to 0 and all spoken history is dropped.
    pub fn set_script(&mut self, text: &str, now: Instant) {
        self.script = Script::new(text);
        self.index = NgramIndex::build(&self.script, self.config.strong_min, self.config.strong_max);
        self.reset(now);
    }

    /// Clear pointer, spoken history and skipped spans; the script stays.
    pub fn reset(&mut self, now: Instant) {
        self.pointer = 0;
        self.tail.clear();
        self.skipped.clear();
        self.last_advance = now;
        self.last_reason = AdvanceReason::Hold;
    }

    /// Replace the in-flight partial transcript and realign. Returns whether
    /// the pointer moved.
    pub fn apply_partial(&mut self, text: &str, now: Instant) -> bool {
        self.tail.set_partial(text);
        self.realign(now)
    }

    /// Append one confirmed utterance (clearing the partial it grew from)
    /// and realign. Returns whether the pointer moved.
    pub fn apply_final(&mut self, text: &str, now: Instant) -> bool {
        self.tail.push_final(text);
        self.realign(now)
    }

    /// Idle-monitor decision: if speech is flowing (non-empty partial) but
    /// nothing has matched for the idle timeout, force a one-token slide so
    /// the highlight never stalls indefinitely.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.tail.partial().is_empty() {
            return false;
        }
        if now.duration_since(self.last_advance) < self.config.idle_timeout {
            return false;
        }
        if self.pointer >= self.script.len() {
            return false;
        }
        self.pointer += 1;
        self.last_advance = now;
        self.last_reason = AdvanceReason::TimeoutSlide;
        tracing::debug!(pointer = self.pointer, "timeout_slide");
        true
    }

    fn realign(&mut self, now: Instant) -> bool {
        let out = advance(
            &self.script,
            &self.index,
            &self.config,
            self.pointer,
            self.tail.tokens(),
        );
        debug_assert!(out.pointer >= self.pointer && out.pointer <= self.script.len());

        let moved = out.pointer != self.pointer;
        if moved {
            // a jump longer than the matched span means script tokens were
            // passed over unspoken; remember them for gap-fill callers
            if let Some(matched) = out.reason.matched_len() {
                let skip_end = out.pointer.saturating_sub(matched).max(self.pointer);
                if skip_end > self.pointer {
                    self.skipped.push((self.pointer, skip_end));
                }
            }
            self.pointer = out.pointer;
            self.last_advance = now;
            tracing::debug!(pointer = self.pointer, reason = %out.reason, "pointer_advanced");
        }
        self.last_reason = out.reason;
        moved
    }

    pub fn frame(&self) -> HighlightFrame {
        build_frame(
            &self.script,
            self.pointer,
            &self.config,
            self.tail.partial(),
            self.tail.finals(),
        )
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Raw script text of every span the pointer has jumped over unspoken,
    /// in reading order: the `skipped segments` input of the gap-fill
    /// regeneration service.
    pub fn skipped_segments(&self) -> Vec<String> {
        self.skipped
            .iter()
            .map(|&(from, to)| self.script.span_text(from, to).to_string())
            .collect()
    }

    /// Everything the speaker has confirmed so far, joined for gap-fill.
    pub fn spoken_text(&self) -> String {
        self.tail.finals().join(" ")
    }

    pub fn debug(&self) -> SessionDebug {
        SessionDebug {
            pointer: self.pointer,
            token_count: self.script.len(),
            tail_len: self.tail.tokens().len(),
            last_reason: self.last_reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SCRIPT: &str = "나는 오늘 날씨가 좋다고 생각한다. 그리고 내일은 비가 온다";

    fn session() -> (AlignmentSession, Instant) {
        let now = Instant::now();
        (AlignmentSession::new(SCRIPT, now), now)
    }

    #[test]
    fn partial_update_advances_pointer() {
        let (mut s, now) = session();
        assert!(s.apply_partial("오늘 날씨가 좋다고", now));
        assert_eq!(s.pointer(), 4);
        assert_eq!(s.debug().last_reason, "strong 3-gram");
    }

    #[test]
    fn empty_tail_never_moves_pointer() {
        let (mut s, now) = session();
        assert!(!s.apply_partial("", now));
        assert_eq!(s.pointer(), 0);
        assert_eq!(s.debug().last_reason, "hold");
    }

    #[test]
    fn final_clears_partial_and_keeps_history() {
        let (mut s, now) = session();
        s.apply_partial("나는 오늘 날씨", now);
        s.apply_final("나는 오늘 날씨가", now);
        let frame = s.frame();
        assert_eq!(frame.partial_text, "");
        assert_eq!(frame.final_history, ["나는 오늘 날씨가"]);
    }

    #[test]
    fn idle_slide_fires_after_timeout_with_live_partial() {
        let (mut s, now) = session();
        s.apply_partial("웅얼웅얼", now);
        let p = s.pointer();

        assert!(!s.tick(now + Duration::from_millis(500)));
        assert!(s.tick(now + Duration::from_millis(900)));
        assert_eq!(s.pointer(), p + 1);
        assert_eq!(s.debug().last_reason, "timeout slide");

        // the slide itself counts as an advance; the next slide needs a
        // fresh timeout
        assert!(!s.tick(now + Duration::from_millis(1000)));
        assert!(s.tick(now + Duration::from_millis(1800)));
    }

    #[test]
    fn idle_slide_needs_a_nonempty_partial() {
        let (mut s, now) = session();
        s.apply_final("나는", now);
        assert!(!s.tick(now + Duration::from_secs(10)));
    }

    #[test]
    fn idle_slide_stops_at_script_end() {
        let now = Instant::now();
        let mut s = AlignmentSession::new("한 두", now);
        s.apply_partial("한 두", now);
        assert_eq!(s.pointer(), 2);
        assert!(!s.tick(now + Duration::from_secs(5)));
        assert_eq!(s.pointer(), 2);
    }

    #[test]
    fn set_script_resets_everything() {
        let (mut s, now) = session();
        s.apply_final("오늘 날씨가 좋다고", now);
        assert!(s.pointer() > 0);

        s.set_script("완전히 다른 원고 입니다", now);
        assert_eq!(s.pointer(), 0);
        let frame = s.frame();
        assert!(frame.final_history.is_empty());
        assert_eq!(frame.partial_text, "");
        assert_eq!(frame.progress_percent, 0);
        assert!(s.skipped_segments().is_empty());
    }

    #[test]
    fn reset_keeps_script_but_clears_state() {
        let (mut s, now) = session();
        s.apply_final("오늘 날씨가 좋다고", now);
        s.reset(now);
        assert_eq!(s.pointer(), 0);
        assert_eq!(s.script().text(), SCRIPT);
        assert!(s.frame().final_history.is_empty());
    }

    #[test]
    fn skipped_spans_are_recorded_on_jumps() {
        let (mut s, now) = session();
        // speaker jumps straight to tokens 5..8, skipping 0..5
        assert!(s.apply_partial("그리고 내일은 비가", now));
        assert_eq!(s.pointer(), 8);
        assert_eq!(
            s.skipped_segments(),
            ["나는 오늘 날씨가 좋다고 생각한다."]
        );
    }

    #[test]
    fn contiguous_reading_skips_nothing() {
        let (mut s, now) = session();
        s.apply_partial("나는 오늘 날씨가", now);
        s.apply_final("나는 오늘 날씨가 좋다고 생각한다", now);
        assert!(s.skipped_segments().is_empty());
    }

    #[test]
    fn frame_reflects_progress() {
        let (mut s, now) = session();
        s.apply_partial("오늘 날씨가 좋다고", now);
        let frame = s.frame();
        // 4 of 9 tokens confirmed
        assert_eq!(frame.progress_percent, 44);
        assert!(frame.before_text.starts_with("나는"));
        assert!(frame.current_text.starts_with("생각한다."));
    }
}
