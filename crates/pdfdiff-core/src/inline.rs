//! Word-level breakdown of a modified segment pair.

use serde::Serialize;

use crate::differ::lcs_matches;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineKind {
    Equal,
    /// Present only in the new text.
    Insert,
    /// Present only in the old text.
    Delete,
}

/// A run of words sharing one [`InlineKind`], joined by single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineSpan {
    pub kind: InlineKind,
    pub text: String,
}

/// Align the words of `old` and `new` and return the merged spans.
///
/// Within an unmatched run, deletions come before insertions. Adjacent words
/// of the same kind are merged into one span.
pub fn diff_words(old: &str, new: &str) -> Vec<InlineSpan> {
    let old_words: Vec<&str> = old.split_whitespace().collect();
    let new_words: Vec<&str> = new.split_whitespace().collect();
    let matches = lcs_matches(&old_words, &new_words, |a, b| a == b);

    let mut spans: Vec<InlineSpan> = Vec::new();
    let mut oi = 0;
    let mut nj = 0;
    for &(mi, mj) in &matches {
        push_words(&mut spans, InlineKind::Delete, &old_words[oi..mi]);
        push_words(&mut spans, InlineKind::Insert, &new_words[nj..mj]);
        push_words(&mut spans, InlineKind::Equal, &old_words[mi..=mi]);
        oi = mi + 1;
        nj = mj + 1;
    }
    push_words(&mut spans, InlineKind::Delete, &old_words[oi..]);
    push_words(&mut spans, InlineKind::Insert, &new_words[nj..]);
    spans
}

fn push_words(spans: &mut Vec<InlineSpan>, kind: InlineKind, words: &[&str]) {
    if words.is_empty() {
        return;
    }
    let joined = words.join(" ");
    match spans.last_mut() {
        Some(last) if last.kind == kind => {
            last.text.push(' ');
            last.text.push_str(&joined);
        }
        _ => spans.push(InlineSpan { kind, text: joined }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(kind: InlineKind, text: &str) -> InlineSpan {
        InlineSpan {
            kind,
            text: text.to_string(),
        }
    }

    /// Reassemble the old-side text from spans (equal + deleted words).
    fn old_text(spans: &[InlineSpan]) -> String {
        side_text(spans, InlineKind::Delete)
    }

    /// Reassemble the new-side text from spans (equal + inserted words).
    fn new_text(spans: &[InlineSpan]) -> String {
        side_text(spans, InlineKind::Insert)
    }

    fn side_text(spans: &[InlineSpan], own: InlineKind) -> String {
        spans
            .iter()
            .filter(|s| s.kind == InlineKind::Equal || s.kind == own)
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_single_word_replacement() {
        let spans = diff_words("Line two", "Line 2");
        assert_eq!(
            spans,
            vec![
                span(InlineKind::Equal, "Line"),
                span(InlineKind::Delete, "two"),
                span(InlineKind::Insert, "2"),
            ]
        );
    }

    #[test]
    fn test_merges_adjacent_words() {
        let spans = diff_words("the quick brown fox", "the slow red fox jumps");
        assert_eq!(
            spans,
            vec![
                span(InlineKind::Equal, "the"),
                span(InlineKind::Delete, "quick brown"),
                span(InlineKind::Insert, "slow red"),
                span(InlineKind::Equal, "fox"),
                span(InlineKind::Insert, "jumps"),
            ]
        );
    }

    #[test]
    fn test_sides_reassemble() {
        let old = "a b c d";
        let new = "a x c d e";
        let spans = diff_words(old, new);
        assert_eq!(old_text(&spans), old);
        assert_eq!(new_text(&spans), new);
    }

    #[test]
    fn test_whitespace_only_difference_is_equal() {
        let spans = diff_words("a  b", "a b");
        assert_eq!(spans, vec![span(InlineKind::Equal, "a b")]);
    }
}
