//! End-to-end properties of the differ and reporter over plain segment
//! sequences. No PDF backend is involved.

use pdfdiff_core::{Classification, ClassifiedSegment, TextSegment, diff, segments_from};

/// Every input segment must appear exactly once on its side of the result.
fn assert_each_segment_once(old: &[TextSegment], new: &[TextSegment]) {
    let result = diff(old, new);

    let olds: Vec<&TextSegment> = result.segments.iter().filter_map(|s| s.old()).collect();
    let news: Vec<&TextSegment> = result.segments.iter().filter_map(|s| s.new()).collect();

    assert_eq!(olds.len(), old.len(), "old side count");
    assert_eq!(news.len(), new.len(), "new side count");
    // Order preserved on both sides.
    for (got, want) in olds.iter().zip(old.iter()) {
        assert_eq!(*got, want);
    }
    for (got, want) in news.iter().zip(new.iter()) {
        assert_eq!(*got, want);
    }
}

fn fixtures() -> Vec<(Vec<TextSegment>, Vec<TextSegment>)> {
    vec![
        (segments_from(["a", "b", "c"]), segments_from(["a", "b", "c"])),
        (segments_from(Vec::<&str>::new()), segments_from(["x", "y"])),
        (segments_from(["x", "y"]), segments_from(Vec::<&str>::new())),
        (
            segments_from(["intro", "alpha", "beta", "outro"]),
            segments_from(["intro", "gamma", "outro", "appendix"]),
        ),
        (
            segments_from(["dup", "dup", "mid", "dup"]),
            segments_from(["mid", "dup", "dup", "dup", "dup"]),
        ),
        (
            segments_from(["p", "q", "r", "s"]),
            segments_from(["s", "r", "q", "p"]),
        ),
    ]
}

#[test]
fn every_segment_appears_exactly_once() {
    for (old, new) in fixtures() {
        assert_each_segment_once(&old, &new);
    }
}

#[test]
fn self_comparison_is_all_unchanged() {
    let doc = segments_from(["Chapter 1", "It was a dark night.", "Chapter 2", "Chapter 1"]);
    let result = diff(&doc, &doc);

    assert_eq!(result.summary.added, 0);
    assert_eq!(result.summary.removed, 0);
    assert_eq!(result.summary.modified, 0);
    assert_eq!(result.summary.unchanged, doc.len());
    assert!(
        result
            .segments
            .iter()
            .all(|s| s.classification() == Classification::Unchanged)
    );
}

#[test]
fn empty_first_document_marks_everything_added() {
    let new = segments_from(["one", "two", "three"]);
    let result = diff(&[], &new);

    assert_eq!(result.summary.added, new.len());
    assert_eq!(result.summary.removed, 0);
    assert!(
        result
            .segments
            .iter()
            .all(|s| matches!(s, ClassifiedSegment::Added { .. }))
    );
}

#[test]
fn both_empty_is_an_empty_result() {
    let result = diff(&[], &[]);
    assert!(result.segments.is_empty());
    assert_eq!(result.summary.total, 0);
    assert!(!result.summary.has_changes());
}

#[test]
fn modified_line_scenario() {
    let old = segments_from(["Hello world", "Line two"]);
    let new = segments_from(["Hello world", "Line 2"]);
    let result = diff(&old, &new);

    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.segments[0].classification(), Classification::Unchanged);
    match &result.segments[1] {
        ClassifiedSegment::Modified { old, new, .. } => {
            assert_eq!(old.content, "Line two");
            assert_eq!(new.content, "Line 2");
        }
        other => panic!("expected Modified, got {:?}", other),
    }
    assert_eq!(result.summary.added, 0);
    assert_eq!(result.summary.removed, 0);
    assert_eq!(result.summary.modified, 1);
}

#[test]
fn appended_segment_scenario() {
    let old = segments_from(["X", "Y"]);
    let new = segments_from(["X", "Y", "Z"]);
    let result = diff(&old, &new);

    let added: Vec<&str> = result
        .segments
        .iter()
        .filter(|s| s.classification() == Classification::Added)
        .filter_map(|s| s.new())
        .map(|s| s.content.as_str())
        .collect();
    assert_eq!(added, vec!["Z"]);
    assert_eq!(result.summary.added, 1);
    assert_eq!(result.summary.removed, 0);
    assert_eq!(result.summary.modified, 0);
}

#[test]
fn diff_is_idempotent() {
    for (old, new) in fixtures() {
        assert_eq!(diff(&old, &new), diff(&old, &new));
    }
}
