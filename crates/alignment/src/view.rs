use crate::config::AlignConfig;
use crate::script::Script;

/// Complete snapshot of what the display collaborator needs to draw one
/// frame: the script split around the highlight window, overall progress,
/// and the live transcript state. This is the rendering contract.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize, specta::Type)]
pub struct HighlightFrame {
    #[serde(rename = "beforeText")]
    pub before_text: String,
    #[serde(rename = "currentText")]
    pub current_text: String,
    #[serde(rename = "afterText")]
    pub after_text: String,
    #[serde(rename = "progressPercent")]
    pub progress_percent: u8,
    #[serde(rename = "partialText")]
    pub partial_text: String,
    #[serde(rename = "finalHistory")]
    pub final_history: Vec<String>,
}

/// End of the highlight window `[pointer, end)`: extend one token at a time,
/// stopping (inclusive) at the first sentence-terminal token or at
/// `highlight_max` tokens, whichever comes first. The scan itself is bounded
/// by `highlight_scan`.
pub fn window_end(script: &Script, pointer: usize, config: &AlignConfig) -> usize {
    let tokens = script.tokens();
    let mut end = pointer;
    for i in pointer..tokens.len().min(pointer + config.highlight_scan) {
        end = i + 1;
        if tokens[i].is_terminal {
            break;
        }
        if end - pointer >= config.highlight_max {
            break;
        }
    }
    end
}

/// Split the source script around the highlight window via the token
/// position map, without re-scanning the text.
pub fn build_frame(
    script: &Script,
    pointer: usize,
    config: &AlignConfig,
    partial: &str,
    finals: &[String],
) -> HighlightFrame {
    let tokens = script.tokens();
    let text = script.text();
    let end_token = window_end(script, pointer, config);

    let start_idx = tokens.get(pointer).map_or(text.len(), |t| t.start);
    let end_idx = if end_token > 0 {
        tokens[end_token - 1].end.max(start_idx)
    } else {
        start_idx
    };

    HighlightFrame {
        before_text: text[..start_idx].to_string(),
        current_text: text[start_idx..end_idx].to_string(),
        after_text: text[end_idx..].to_string(),
        progress_percent: progress_percent(pointer, tokens.len()),
        partial_text: partial.to_string(),
        final_history: finals.to_vec(),
    }
}

pub fn progress_percent(pointer: usize, total_tokens: usize) -> u8 {
    (pointer as f64 / total_tokens.max(1) as f64 * 100.0).round() as u8
}
