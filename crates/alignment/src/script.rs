use crate::normalize::normalize_token;

/// Characters that mark a sentence-terminal token when they end its raw form.
const TERMINALS: &[char] = &['.', '!', '?', '…'];

/// One whitespace-delimited unit of the script. Immutable once produced.
///
/// `start`/`end` are byte offsets into the source text, so slicing the source
/// through them reproduces the raw token exactly; the display layer splits
/// the original script without re-scanning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptToken {
    pub start: usize,
    pub end: usize,
    pub normalized: String,
    pub is_terminal: bool,
}

/// The current script: source text plus its ordered tokens. Position in the
/// token list is the unit the read pointer addresses.
#[derive(Debug, Clone, Default)]
pub struct Script {
    text: String,
    tokens: Vec<ScriptToken>,
}

impl Script {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut tokens = Vec::new();

        let mut start: Option<usize> = None;
        for (i, c) in text.char_indices() {
            if c.is_whitespace() {
                if let Some(s) = start.take() {
                    tokens.push(Self::token(&text, s, i));
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            tokens.push(Self::token(&text, s, text.len()));
        }

        Self { text, tokens }
    }

    fn token(text: &str, start: usize, end: usize) -> ScriptToken {
        let raw = &text[start..end];
        ScriptToken {
            start,
            end,
            normalized: normalize_token(raw),
            is_terminal: raw.chars().next_back().is_some_and(|c| TERMINALS.contains(&c)),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[ScriptToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Raw source slice for token `i`.
    pub fn raw(&self, i: usize) -> &str {
        let t = &self.tokens[i];
        &self.text[t.start..t.end]
    }

    /// Raw source slice covering the token span `[from, to)`, including the
    /// original whitespace between the tokens.
    pub fn span_text(&self, from: usize, to: usize) -> &str {
        if from >= to || from >= self.tokens.len() {
            return "";
        }
        let to = to.min(self.tokens.len());
        &self.text[self.tokens[from].start..self.tokens[to - 1].end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_round_trip_to_source() {
        let s = Script::new("  Hello,  world!\nnext line ");
        let raws: Vec<&str> = (0..s.len()).map(|i| s.raw(i)).collect();
        assert_eq!(raws, ["Hello,", "world!", "next", "line"]);
    }

    #[test]
    fn terminal_flag_on_closing_punctuation() {
        let s = Script::new("끝. 계속 진짜? 와! 그리고… 마지막");
        let flags: Vec<bool> = s.tokens().iter().map(|t| t.is_terminal).collect();
        assert_eq!(flags, [true, false, true, true, true, false]);
    }

    #[test]
    fn normalized_forms_strip_punctuation() {
        let s = Script::new("Hello, World!");
        assert_eq!(s.tokens()[0].normalized, "hello");
        assert_eq!(s.tokens()[1].normalized, "world");
    }

    #[test]
    fn multibyte_offsets_are_byte_accurate() {
        let text = "나는 오늘 날씨가 좋다고 생각한다";
        let s = Script::new(text);
        assert_eq!(s.len(), 5);
        assert_eq!(s.raw(2), "날씨가");
        assert_eq!(s.span_text(1, 4), "오늘 날씨가 좋다고");
        assert_eq!(s.span_text(0, s.len()), text);
    }

    #[test]
    fn empty_and_blank_scripts() {
        assert!(Script::new("").is_empty());
        assert!(Script::new(" \n\t ").is_empty());
        assert_eq!(Script::new("").span_text(0, 0), "");
    }
}
