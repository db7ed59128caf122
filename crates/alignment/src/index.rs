use std::collections::HashMap;

use crate::script::Script;

/// Length-keyed n-gram index over a script's normalized tokens.
///
/// For each n in `[n_min, n_max]`, maps the space-joined gram text to the
/// ascending list of start positions where it occurs. Built in one
/// left-to-right pass with gram extension, so construction is linear in
/// `token_count * n_max` and the position lists come out sorted with no
/// explicit sort step.
#[derive(Debug, Clone)]
pub struct NgramIndex {
    n_min: usize,
    n_max: usize,
    tables: Vec<HashMap<String, Vec<usize>>>,
}

impl NgramIndex {
    pub fn build(script: &Script, n_min: usize, n_max: usize) -> Self {
        debug_assert!(n_min >= 1 && n_min <= n_max);
        let tokens = script.tokens();
        let mut tables = vec![HashMap::new(); n_max - n_min + 1];

        for i in 0..tokens.len() {
            let mut gram = tokens[i].normalized.clone();
            if n_min == 1 {
                tables[0].entry(gram.clone()).or_insert_with(Vec::new).push(i);
            }
            for n in 2..=n_max {
                let j = i + n - 1;
                if j >= tokens.len() {
                    break;
                }
                gram.push(' ');
                gram.push_str(&tokens[j].normalized);
                if n >= n_min {
                    tables[n - n_min]
                        .entry(gram.clone())
                        .or_insert_with(Vec::new)
                        .push(i);
                }
            }
        }

        Self {
            n_min,
            n_max,
            tables,
        }
    }

    pub fn n_min(&self) -> usize {
        self.n_min
    }

    pub fn n_max(&self) -> usize {
        self.n_max
    }

    /// Ascending occurrence positions for a gram of length `n`.
    pub fn positions(&self, n: usize, key: &str) -> Option<&[usize]> {
        if n < self.n_min || n > self.n_max {
            return None;
        }
        self.tables[n - self.n_min].get(key).map(Vec::as_slice)
    }

    /// First occurrence of the gram at or after `pointer`, if any.
    pub fn first_at_or_after(&self, n: usize, key: &str, pointer: usize) -> Option<usize> {
        let positions = self.positions(n, key)?;
        let i = positions.partition_point(|&p| p < pointer);
        positions.get(i).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(text: &str) -> (Script, NgramIndex) {
        let script = Script::new(text);
        let idx = NgramIndex::build(&script, 3, 6);
        (script, idx)
    }

    #[test]
    fn indexes_all_lengths_in_range() {
        let (_, idx) = index("a b c d e f g");
        assert_eq!(idx.positions(3, "a b c"), Some(&[0][..]));
        assert_eq!(idx.positions(4, "b c d e"), Some(&[1][..]));
        assert_eq!(idx.positions(6, "a b c d e f"), Some(&[0][..]));
        assert_eq!(idx.positions(6, "b c d e f g"), Some(&[1][..]));
        assert!(idx.positions(2, "a b").is_none());
        assert!(idx.positions(7, "a b c d e f g").is_none());
    }

    #[test]
    fn repeated_grams_collect_ascending_positions() {
        let (_, idx) = index("x y z q x y z");
        assert_eq!(idx.positions(3, "x y z"), Some(&[0, 4][..]));
    }

    #[test]
    fn lookup_respects_pointer() {
        let (_, idx) = index("x y z q x y z");
        assert_eq!(idx.first_at_or_after(3, "x y z", 0), Some(0));
        assert_eq!(idx.first_at_or_after(3, "x y z", 1), Some(4));
        assert_eq!(idx.first_at_or_after(3, "x y z", 5), None);
        assert_eq!(idx.first_at_or_after(3, "q x y", 0), Some(3));
    }

    #[test]
    fn entries_fit_within_token_count() {
        let (script, idx) = index("a b c d e");
        for n in 3..=6 {
            let last_valid = script.len().saturating_sub(n);
            for start in 0..script.len() {
                let key: Vec<&str> = script.tokens()[start..(start + n).min(script.len())]
                    .iter()
                    .map(|t| t.normalized.as_str())
                    .collect();
                if let Some(ps) = idx.positions(n, &key.join(" ")) {
                    assert!(ps.iter().all(|&p| p <= last_valid));
                }
            }
        }
    }

    #[test]
    fn grams_use_normalized_token_text() {
        let (_, idx) = index("Hello, big WORLD again ok");
        assert_eq!(idx.positions(3, "hello big world"), Some(&[0][..]));
    }
}
