use crate::normalize::spoken_tokens;

/// Bounded recent window of normalized spoken tokens, recomputed from the
/// confirmed utterance history plus the current partial on every update.
///
/// Only the newest utterances are re-tokenized: the walk stops once the cap
/// is covered, so per-update cost is bounded by the cap, not by how long the
/// session has been running.
#[derive(Debug, Clone)]
pub struct SpokenTail {
    finals: Vec<String>,
    partial: String,
    tokens: Vec<String>,
    cap: usize,
}

impl SpokenTail {
    pub fn new(cap: usize) -> Self {
        Self {
            finals: Vec::new(),
            partial: String::new(),
            tokens: Vec::new(),
            cap,
        }
    }

    /// Replace (not append) the current partial text.
    pub fn set_partial(&mut self, text: &str) {
        self.partial.clear();
        self.partial.push_str(text);
        self.recompute();
    }

    /// Append one confirmed utterance; the partial it grew from is cleared.
    pub fn push_final(&mut self, text: &str) {
        self.finals.push(text.to_string());
        self.partial.clear();
        self.recompute();
    }

    pub fn clear(&mut self) {
        self.finals.clear();
        self.partial.clear();
        self.tokens.clear();
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn partial(&self) -> &str {
        &self.partial
    }

    pub fn finals(&self) -> &[String] {
        &self.finals
    }

    fn recompute(&mut self) {
        let mut chunks: Vec<Vec<String>> = Vec::new();
        let mut total = 0;

        let partial_tokens = spoken_tokens(&self.partial);
        total += partial_tokens.len();
        chunks.push(partial_tokens);

        for text in self.finals.iter().rev() {
            if total >= self.cap {
                break;
            }
            let toks = spoken_tokens(text);
            total += toks.len();
            chunks.push(toks);
        }

        let mut tokens: Vec<String> = chunks.into_iter().rev().flatten().collect();
        if tokens.len() > self.cap {
            tokens.drain(..tokens.len() - self.cap);
        }
        self.tokens = tokens;
    }
}
