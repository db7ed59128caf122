use std::collections::HashSet;
use std::fmt;

use crate::config::AlignConfig;
use crate::index::NgramIndex;
use crate::script::Script;

/// Why the advancer did (or did not) move the pointer. `Display` yields the
/// diagnostic strings surfaced to observability (`strong 3-gram`,
/// `punct slide`, `hold`, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceReason {
    Strong(usize),
    Weak(usize),
    Similarity { window: usize, score: f64 },
    PunctSlide,
    TimeoutSlide,
    Hold,
}

impl AdvanceReason {
    /// Length of the matched script span, for tiers that matched one.
    pub fn matched_len(&self) -> Option<usize> {
        match self {
            Self::Strong(n) | Self::Weak(n) => Some(*n),
            Self::Similarity { window, .. } => Some(*window),
            Self::PunctSlide | Self::TimeoutSlide | Self::Hold => None,
        }
    }
}

impl fmt::Display for AdvanceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong(n) => write!(f, "strong {n}-gram"),
            Self::Weak(n) => write!(f, "weak {n}-gram"),
            Self::Similarity { window, score } => {
                write!(f, "similarity w={window} ({score:.2})")
            }
            Self::PunctSlide => write!(f, "punct slide"),
            Self::TimeoutSlide => write!(f, "timeout slide"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceOutcome {
    pub pointer: usize,
    pub reason: AdvanceReason,
}

impl AdvanceOutcome {
    fn hold(pointer: usize) -> Self {
        Self {
            pointer,
            reason: AdvanceReason::Hold,
        }
    }
}

/// The pointer-advancement cascade. Tiers are evaluated in strict order and
/// the first success wins; there is no cross-tier score blending. Absence of
/// a match is the normal `hold` outcome, never an error. The returned pointer
/// is always `>=` the input pointer.
pub fn advance(
    script: &Script,
    index: &NgramIndex,
    config: &AlignConfig,
    pointer: usize,
    tail: &[String],
) -> AdvanceOutcome {
    if tail.is_empty() {
        return AdvanceOutcome::hold(pointer);
    }
    let tokens = script.tokens();
    let len = tail.len();

    // 1) strong n-gram, longest first (less ambiguous)
    let strong_top = config.strong_max.min(len);
    for n in (config.strong_min..=strong_top).rev() {
        let key = tail[len - n..].join(" ");
        if let Some(occ) = index.first_at_or_after(n, &key, pointer) {
            let next = occ + n;
            if next > pointer {
                return AdvanceOutcome {
                    pointer: next,
                    reason: AdvanceReason::Strong(n),
                };
            }
        }
    }

    // 2) weak local match near the pointer
    if len >= 2 {
        let (t0, t1) = (&tail[len - 2], &tail[len - 1]);
        let mut p = pointer;
        while p + 2 <= tokens.len() && p < pointer + config.weak_phrase_window {
            if tokens[p].normalized == *t0 && tokens[p + 1].normalized == *t1 {
                return AdvanceOutcome {
                    pointer: p + 2,
                    reason: AdvanceReason::Weak(2),
                };
            }
            p += 1;
        }
    }
    if let Some(last) = tail.last() {
        let bound = tokens.len().min(pointer + config.weak_single_window);
        for p in pointer..bound {
            if tokens[p].normalized == *last {
                return AdvanceOutcome {
                    pointer: p + 1,
                    reason: AdvanceReason::Weak(1),
                };
            }
        }
    }

    // 3) character-similarity fallback over the next few tokens
    let tail_from = len.saturating_sub(config.sim_tail_tokens);
    let tail_set = qgrams(&tail[tail_from..].join(" "), 2);
    for &(window, threshold) in &config.sim_windows {
        let end = (pointer + window).min(tokens.len());
        if end <= pointer {
            continue;
        }
        let candidate = tokens[pointer..end]
            .iter()
            .map(|t| t.normalized.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if candidate.trim().is_empty() {
            continue;
        }
        let score = jaccard(&tail_set, &qgrams(&candidate, 2));
        if score >= threshold {
            return AdvanceOutcome {
                pointer: end,
                reason: AdvanceReason::Similarity { window, score },
            };
        }
    }

    // 4) one-token slide past a sentence boundary, bridging filler words
    //    that are absent from the script
    if pointer > 0 && pointer <= tokens.len() && tokens[pointer - 1].is_terminal {
        return AdvanceOutcome {
            pointer: (pointer + 1).min(tokens.len()),
            reason: AdvanceReason::PunctSlide,
        };
    }

    AdvanceOutcome::hold(pointer)
}

/// Character shingle set, whitespace stripped so recognition's word-boundary
/// jitter doesn't count against the comparison.
fn qgrams(s: &str, q: usize) -> HashSet<String> {
    let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.len() < q {
        return HashSet::new();
    }
    chars.windows(q).map(|w| w.iter().collect()).collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    if union == 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}
