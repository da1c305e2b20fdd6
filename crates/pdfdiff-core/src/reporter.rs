//! Aggregation of classified segments into summary counts and a numbered
//! change list for navigation.

use serde::Serialize;

use crate::differ::{ClassifiedSegment, ComparisonResult};
use crate::{Classification, DocumentSide};

/// Counts per classification plus word totals.
///
/// `added`, `removed` and `modified` are the headline numbers; `unchanged`
/// is kept for completeness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
    /// Number of entries in the classified sequence.
    pub total: usize,
    pub added_words: usize,
    pub removed_words: usize,
    pub modified_words_old: usize,
    pub modified_words_new: usize,
}

impl Summary {
    pub fn count(&self, classification: Classification) -> usize {
        match classification {
            Classification::Unchanged => self.unchanged,
            Classification::Added => self.added,
            Classification::Removed => self.removed,
            Classification::Modified => self.modified,
        }
    }

    /// Share of the classified sequence, in percent. 0 when empty.
    pub fn percentage(&self, classification: Classification) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(classification) as f64 / self.total as f64 * 100.0
        }
    }

    /// Net word change across modified pairs (new minus old).
    pub fn modified_word_delta(&self) -> i64 {
        self.modified_words_new as i64 - self.modified_words_old as i64
    }

    pub fn has_changes(&self) -> bool {
        self.added + self.removed + self.modified > 0
    }
}

/// Aggregate a classified sequence into a [`Summary`].
pub fn summarize(segments: &[ClassifiedSegment]) -> Summary {
    let mut summary = Summary {
        total: segments.len(),
        ..Summary::default()
    };
    for segment in segments {
        match segment {
            ClassifiedSegment::Unchanged { .. } => summary.unchanged += 1,
            ClassifiedSegment::Added { new } => {
                summary.added += 1;
                summary.added_words += new.word_count();
            }
            ClassifiedSegment::Removed { old } => {
                summary.removed += 1;
                summary.removed_words += old.word_count();
            }
            ClassifiedSegment::Modified { old, new, .. } => {
                summary.modified += 1;
                summary.modified_words_old += old.word_count();
                summary.modified_words_new += new.word_count();
            }
        }
    }
    summary
}

/// One numbered change, addressable from either side of a rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEntry {
    pub kind: Classification,
    /// 1-based number among changes of the same kind.
    pub number: usize,
    /// Position in [`ComparisonResult::segments`].
    pub position: usize,
    /// Anchor in the first-document view (deletions and modifications).
    pub old_anchor: Option<String>,
    /// Anchor in the second-document view (additions and modifications).
    pub new_anchor: Option<String>,
}

impl ChangeEntry {
    pub fn label(&self) -> String {
        let noun = match self.kind {
            Classification::Added => "Addition",
            Classification::Removed => "Deletion",
            Classification::Modified => "Change",
            Classification::Unchanged => "Unchanged",
        };
        format!("{} #{}", noun, self.number)
    }
}

/// Anchor id for the `number`-th change of `kind` on `side`,
/// e.g. `new-addition-2` or `old-modification-1`.
pub fn anchor_id(side: DocumentSide, kind: Classification, number: usize) -> String {
    let noun = match kind {
        Classification::Added => "addition",
        Classification::Removed => "deletion",
        Classification::Modified => "modification",
        Classification::Unchanged => "unchanged",
    };
    format!("{}-{}-{}", side.anchor_prefix(), noun, number)
}

/// Number every change in document order.
pub fn changes(result: &ComparisonResult) -> Vec<ChangeEntry> {
    let mut additions = 0;
    let mut deletions = 0;
    let mut modifications = 0;
    let mut entries = Vec::new();

    for (position, segment) in result.segments.iter().enumerate() {
        let kind = segment.classification();
        let (number, old_anchor, new_anchor) = match kind {
            Classification::Unchanged => continue,
            Classification::Added => {
                additions += 1;
                (
                    additions,
                    None,
                    Some(anchor_id(DocumentSide::Second, kind, additions)),
                )
            }
            Classification::Removed => {
                deletions += 1;
                (
                    deletions,
                    Some(anchor_id(DocumentSide::First, kind, deletions)),
                    None,
                )
            }
            Classification::Modified => {
                modifications += 1;
                (
                    modifications,
                    Some(anchor_id(DocumentSide::First, kind, modifications)),
                    Some(anchor_id(DocumentSide::Second, kind, modifications)),
                )
            }
        };
        entries.push(ChangeEntry {
            kind,
            number,
            position,
            old_anchor,
            new_anchor,
        });
    }
    entries
}
