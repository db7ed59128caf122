use std::time::Duration;

/// Tuning knobs for the alignment cascade and highlight window.
///
/// The defaults are the empirically chosen values the cascade was tuned with;
/// the semantics live in the tier order, not in these numbers.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    /// Shortest n-gram tried by the strong tier.
    pub strong_min: usize,
    /// Longest n-gram tried by the strong tier (tried first).
    pub strong_max: usize,
    /// Most recent spoken tokens kept for matching.
    pub tail_cap: usize,
    /// Forward window scanned for the last-two-token phrase in the weak tier.
    pub weak_phrase_window: usize,
    /// Forward window scanned for the last single token in the weak tier.
    pub weak_single_window: usize,
    /// Tail tokens joined for the character-similarity comparison.
    pub sim_tail_tokens: usize,
    /// Candidate window widths with their inclusive Jaccard thresholds, in
    /// the order they are tried. Wider windows tolerate lower similarity
    /// because more characters dampen recognition noise.
    pub sim_windows: [(usize, f64); 3],
    /// Hard cap on the highlight window, in tokens.
    pub highlight_max: usize,
    /// Forward scan bound when building the highlight window.
    pub highlight_scan: usize,
    /// No-match interval after which a non-empty partial forces a one-token
    /// slide.
    pub idle_timeout: Duration,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            strong_min: 3,
            strong_max: 6,
            tail_cap: 40,
            weak_phrase_window: 10,
            weak_single_window: 6,
            sim_tail_tokens: 12,
            sim_windows: [(4, 0.55), (3, 0.60), (2, 0.65)],
            highlight_max: 5,
            highlight_scan: 10,
            idle_timeout: Duration::from_millis(900),
        }
    }
}
