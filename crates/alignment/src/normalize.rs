use unicode_normalization::UnicodeNormalization;

/// Punctuation stripped during normalization. Matching is over spoken words;
/// written punctuation never survives recognition, so it must not survive
/// canonicalization either.
const PUNCT: &[char] = &[
    '.', ',', '!', '?', '…', '\'', '"', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '(', ')',
    '[', ']', '{', '}', ':', ';', '·', '/', '\\', '-',
];

pub(crate) fn is_punct(c: char) -> bool {
    PUNCT.contains(&c)
}

/// Canonicalize free text for matching: lowercase, NFKC, punctuation class
/// replaced by spaces, whitespace runs collapsed, trimmed. Deterministic and
/// locale-agnostic.
pub fn normalize(text: &str) -> String {
    let folded: String = text.to_lowercase().nfkc().collect();

    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    for c in folded.chars() {
        if c.is_whitespace() || is_punct(c) {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// Per-token variant used for script tokens: punctuation is deleted rather
/// than split on, so `"좋다고,"` and `"좋다고"` canonicalize identically and
/// stay a single token.
pub fn normalize_token(token: &str) -> String {
    token
        .to_lowercase()
        .nfkc()
        .filter(|&c| !is_punct(c) && !c.is_whitespace())
        .collect()
}

/// Split free text into matchable normalized tokens.
pub fn spoken_tokens(text: &str) -> Vec<String> {
    let n = normalize(text);
    if n.is_empty() {
        Vec::new()
    } else {
        n.split(' ').map(str::to_string).collect()
    }
}
