//! Segment alignment and change classification.
//!
//! The alignment is a longest common subsequence over whole segments: two
//! segments match only when their contents are identical. Between two
//! consecutive matches the unmatched segments of each side are paired up
//! positionally as modifications; whatever is left over on one side is a
//! plain removal or addition.

use std::collections::HashMap;

use serde::Serialize;

use crate::inline::{self, InlineSpan};
use crate::reporter::{Summary, summarize};
use crate::{Classification, TextSegment};

/// A segment tagged with its classification.
///
/// `Unchanged` and `Modified` carry both sides of the aligned pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifiedSegment {
    Unchanged {
        old: TextSegment,
        new: TextSegment,
    },
    Added {
        new: TextSegment,
    },
    Removed {
        old: TextSegment,
    },
    Modified {
        old: TextSegment,
        new: TextSegment,
        /// Character-level similarity of the pair, 0.0 to 1.0. Informational only.
        similarity: f64,
        /// Word-level breakdown of the change.
        inline: Vec<InlineSpan>,
    },
}

impl ClassifiedSegment {
    pub fn classification(&self) -> Classification {
        match self {
            ClassifiedSegment::Unchanged { .. } => Classification::Unchanged,
            ClassifiedSegment::Added { .. } => Classification::Added,
            ClassifiedSegment::Removed { .. } => Classification::Removed,
            ClassifiedSegment::Modified { .. } => Classification::Modified,
        }
    }

    /// The segment from the first document, if this entry has one.
    pub fn old(&self) -> Option<&TextSegment> {
        match self {
            ClassifiedSegment::Unchanged { old, .. }
            | ClassifiedSegment::Removed { old }
            | ClassifiedSegment::Modified { old, .. } => Some(old),
            ClassifiedSegment::Added { .. } => None,
        }
    }

    /// The segment from the second document, if this entry has one.
    pub fn new(&self) -> Option<&TextSegment> {
        match self {
            ClassifiedSegment::Unchanged { new, .. }
            | ClassifiedSegment::Added { new }
            | ClassifiedSegment::Modified { new, .. } => Some(new),
            ClassifiedSegment::Removed { .. } => None,
        }
    }

    pub fn is_change(&self) -> bool {
        self.classification() != Classification::Unchanged
    }
}

/// The outcome of comparing two segment sequences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub segments: Vec<ClassifiedSegment>,
    pub summary: Summary,
}

impl ComparisonResult {
    pub fn is_identical(&self) -> bool {
        !self.summary.has_changes()
    }

    /// Iterate over every entry that is not `Unchanged`.
    pub fn changes(&self) -> impl Iterator<Item = &ClassifiedSegment> {
        self.segments.iter().filter(|s| s.is_change())
    }
}

/// Compare two ordered segment sequences.
///
/// Pure and deterministic: the same inputs always produce the same result.
/// Every input segment appears exactly once in the output.
pub fn diff(old: &[TextSegment], new: &[TextSegment]) -> ComparisonResult {
    let (old_ids, new_ids) = intern(old, new);
    let matches = lcs_matches(&old_ids, &new_ids, |a, b| a == b);
    tracing::trace!(
        old = old.len(),
        new = new.len(),
        matched = matches.len(),
        "aligned segments"
    );

    let mut segments = Vec::with_capacity(old.len().max(new.len()));
    let mut oi = 0;
    let mut nj = 0;

    for &(mi, mj) in &matches {
        push_gap(&old[oi..mi], &new[nj..mj], &mut segments);
        segments.push(ClassifiedSegment::Unchanged {
            old: old[mi].clone(),
            new: new[mj].clone(),
        });
        oi = mi + 1;
        nj = mj + 1;
    }
    push_gap(&old[oi..], &new[nj..], &mut segments);

    let summary = summarize(&segments);
    ComparisonResult { segments, summary }
}

/// Classify the unmatched run between two alignment anchors.
fn push_gap(removed: &[TextSegment], added: &[TextSegment], out: &mut Vec<ClassifiedSegment>) {
    let paired = removed.len().min(added.len());

    for (old, new) in removed.iter().zip(added.iter()) {
        let similarity = rapidfuzz::fuzz::ratio(old.content.chars(), new.content.chars());
        let inline = inline::diff_words(&old.content, &new.content);
        out.push(ClassifiedSegment::Modified {
            old: old.clone(),
            new: new.clone(),
            similarity,
            inline,
        });
    }
    for old in &removed[paired..] {
        out.push(ClassifiedSegment::Removed { old: old.clone() });
    }
    for new in &added[paired..] {
        out.push(ClassifiedSegment::Added { new: new.clone() });
    }
}

/// Index pairs `(i, j)` of a longest common subsequence of `a` and `b`,
/// in increasing order on both sides.
///
/// Runs in O(n·m) time and O(n + m) space (Hirschberg's divide and conquer).
/// A common prefix or suffix is matched directly at every level. Elsewhere,
/// ties between longest subsequences are broken toward the earliest match in
/// `b`: a lone element of `a` matches its first occurrence, and each split
/// takes the smallest column that keeps the subsequence longest.
pub(crate) fn lcs_matches<T, F>(a: &[T], b: &[T], eq: F) -> Vec<(usize, usize)>
where
    F: Fn(&T, &T) -> bool,
{
    let mut matches = Vec::new();
    align(a, b, (0, 0), &eq, &mut matches);
    matches
}

fn align<T, F>(a: &[T], b: &[T], offset: (usize, usize), eq: &F, out: &mut Vec<(usize, usize)>)
where
    F: Fn(&T, &T) -> bool,
{
    let prefix = a.iter().zip(b).take_while(|(x, y)| eq(x, y)).count();
    out.extend((0..prefix).map(|k| (offset.0 + k, offset.1 + k)));
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let (ao, bo) = (offset.0 + prefix, offset.1 + prefix);

    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| eq(x, y))
        .count();
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);
    let (n, m) = (a.len(), b.len());

    if n == 1 {
        if let Some(j) = b.iter().position(|y| eq(&a[0], y)) {
            out.push((ao, bo + j));
        }
    } else if n > 1 && m > 0 {
        let mid = n / 2;
        let forward = prefix_lengths(&a[..mid], b, eq);
        let backward = suffix_lengths(&a[mid..], b, eq);

        let mut split = 0;
        let mut best = 0;
        for j in 0..=m {
            let total = forward[j] + backward[j];
            if total > best {
                best = total;
                split = j;
            }
        }

        align(&a[..mid], &b[..split], (ao, bo), eq, out);
        align(&a[mid..], &b[split..], (ao + mid, bo + split), eq, out);
    }

    out.extend((0..suffix).map(|k| (ao + n + k, bo + m + k)));
}

/// `row[j]` = LCS length of `a` and `b[..j]`.
fn prefix_lengths<T, F>(a: &[T], b: &[T], eq: &F) -> Vec<u32>
where
    F: Fn(&T, &T) -> bool,
{
    let mut prev = vec![0u32; b.len() + 1];
    let mut row = vec![0u32; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            row[j + 1] = if eq(x, y) {
                prev[j] + 1
            } else {
                prev[j + 1].max(row[j])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev
}

/// `row[j]` = LCS length of `a` and `b[j..]`.
fn suffix_lengths<T, F>(a: &[T], b: &[T], eq: &F) -> Vec<u32>
where
    F: Fn(&T, &T) -> bool,
{
    let m = b.len();
    let mut prev = vec![0u32; m + 1];
    let mut row = vec![0u32; m + 1];
    for x in a.iter().rev() {
        for j in (0..m).rev() {
            row[j] = if eq(x, &b[j]) {
                prev[j + 1] + 1
            } else {
                prev[j].max(row[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev
}

/// Map each distinct segment text to a small integer so the alignment
/// compares integers instead of strings.
fn intern<'a>(old: &'a [TextSegment], new: &'a [TextSegment]) -> (Vec<u32>, Vec<u32>) {
    let mut ids: HashMap<&'a str, u32> = HashMap::new();
    let mut id_of = |content: &'a str| {
        let next = ids.len() as u32;
        *ids.entry(content).or_insert(next)
    };
    let old_ids: Vec<u32> = old.iter().map(|s| id_of(&s.content)).collect();
    let new_ids: Vec<u32> = new.iter().map(|s| id_of(&s.content)).collect();
    (old_ids, new_ids)
}
