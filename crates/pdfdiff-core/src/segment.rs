use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::TextSegment;
use crate::text_processing::{collapse_whitespace, prepare_text, split_sentences};

/// Unit of text compared between the two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Blocks separated by blank lines.
    #[default]
    Paragraph,
    /// Individual non-empty lines.
    Line,
    /// Sentences within paragraphs.
    Sentence,
}

impl Granularity {
    pub fn all() -> &'static [Granularity] {
        &[
            Granularity::Paragraph,
            Granularity::Line,
            Granularity::Sentence,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Paragraph => "paragraph",
            Granularity::Line => "line",
            Granularity::Sentence => "sentence",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paragraph" | "paragraphs" | "para" => Ok(Granularity::Paragraph),
            "line" | "lines" => Ok(Granularity::Line),
            "sentence" | "sentences" => Ok(Granularity::Sentence),
            other => Err(format!(
                "unknown granularity '{}', expected paragraph, line or sentence",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentOptions {
    pub granularity: Granularity,
    /// Segments with fewer characters than this are dropped.
    pub min_segment_chars: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Paragraph,
            min_segment_chars: 1,
        }
    }
}

impl SegmentOptions {
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }
}

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// Split raw extracted text into ordered segments.
///
/// Whitespace inside a segment is collapsed to single spaces. Indices are
/// assigned after filtering, so they are dense and 0-based.
pub fn segment_text(raw: &str, options: &SegmentOptions) -> Vec<TextSegment> {
    let text = prepare_text(raw);

    let pieces: Vec<String> = match options.granularity {
        Granularity::Paragraph => PARAGRAPH_BREAK
            .split(&text)
            .map(collapse_whitespace)
            .collect(),
        Granularity::Line => text.lines().map(collapse_whitespace).collect(),
        Granularity::Sentence => PARAGRAPH_BREAK
            .split(&text)
            .flat_map(|p| split_sentences(&collapse_whitespace(p)))
            .collect(),
    };

    let min = options.min_segment_chars.max(1);
    pieces
        .into_iter()
        .filter(|p| p.chars().count() >= min)
        .enumerate()
        .map(|(index, content)| TextSegment { index, content })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(segments: &[TextSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.content.as_str()).collect()
    }

    const SAMPLE: &str = "Title line\n\nFirst paragraph\nwraps here. Two sentences!\n \n\n\nLast one";

    #[test]
    fn test_paragraphs() {
        let segs = segment_text(SAMPLE, &SegmentOptions::default());
        assert_eq!(
            contents(&segs),
            vec![
                "Title line",
                "First paragraph wraps here. Two sentences!",
                "Last one"
            ]
        );
        assert_eq!(segs[2].index, 2);
    }

    #[test]
    fn test_lines() {
        let opts = SegmentOptions::default().with_granularity(Granularity::Line);
        let segs = segment_text(SAMPLE, &opts);
        assert_eq!(
            contents(&segs),
            vec![
                "Title line",
                "First paragraph",
                "wraps here. Two sentences!",
                "Last one"
            ]
        );
    }

    #[test]
    fn test_sentences() {
        let opts = SegmentOptions::default().with_granularity(Granularity::Sentence);
        let segs = segment_text(SAMPLE, &opts);
        assert_eq!(
            contents(&segs),
            vec![
                "Title line",
                "First paragraph wraps here.",
                "Two sentences!",
                "Last one"
            ]
        );
    }

    #[test]
    fn test_min_segment_chars_filters_and_reindexes() {
        let opts = SegmentOptions {
            granularity: Granularity::Paragraph,
            min_segment_chars: 3,
        };
        let segs = segment_text("12\n\nabc\n\n7\n\ndefg", &opts);
        assert_eq!(contents(&segs), vec!["abc", "defg"]);
        assert_eq!(segs[1].index, 1);
    }

    #[test]
    fn test_empty_text() {
        assert!(segment_text("", &SegmentOptions::default()).is_empty());
        assert!(segment_text("\n\n  \n", &SegmentOptions::default()).is_empty());
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("Paragraph".parse::<Granularity>(), Ok(Granularity::Paragraph));
        assert_eq!("lines".parse::<Granularity>(), Ok(Granularity::Line));
        assert_eq!(" sentence ".parse::<Granularity>(), Ok(Granularity::Sentence));
        assert!("word".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_granularity_display_round_trips() {
        for g in Granularity::all() {
            assert_eq!(g.to_string().parse::<Granularity>(), Ok(*g));
        }
    }
}
