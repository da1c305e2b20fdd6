use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod differ;
pub mod inline;
pub mod reporter;
pub mod segment;
pub mod text_processing;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use differ::{ClassifiedSegment, ComparisonResult, diff};
pub use inline::{InlineKind, InlineSpan};
pub use reporter::{ChangeEntry, Summary, changes, summarize};
pub use segment::{Granularity, SegmentOptions, segment_text};

/// An ordered, immutable unit of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextSegment {
    /// 0-based position in the source document.
    pub index: usize,
    pub content: String,
}

impl TextSegment {
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Build a segment sequence from plain strings, indexed in order.
pub fn segments_from<I, S>(contents: I) -> Vec<TextSegment>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    contents
        .into_iter()
        .enumerate()
        .map(|(i, c)| TextSegment::new(i, c))
        .collect()
}

/// How a segment relates to the other document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Unchanged,
    Added,
    Removed,
    Modified,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Unchanged => "unchanged",
            Classification::Added => "added",
            Classification::Removed => "removed",
            Classification::Modified => "modified",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two compared documents something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSide {
    First,
    Second,
}

impl DocumentSide {
    /// Prefix used for navigation anchors (`old-…` / `new-…`).
    pub fn anchor_prefix(&self) -> &'static str {
        match self {
            DocumentSide::First => "old",
            DocumentSide::Second => "new",
        }
    }
}

impl fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSide::First => f.write_str("first"),
            DocumentSide::Second => f.write_str("second"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

impl From<BackendError> for ExtractionError {
    fn from(e: BackendError) -> Self {
        ExtractionError::InvalidDocument(e.to_string())
    }
}

/// Configuration for extraction and segmentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub segmentation: SegmentOptions,
    /// Fraction of page height at the top to skip as running header.
    pub header_exclusion: Option<f32>,
    /// Fraction of page height at the bottom to skip as running footer.
    pub footer_exclusion: Option<f32>,
}

/// Returns true when `data` starts with the PDF magic bytes.
pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF-")
}

/// Extract the ordered segments of one PDF.
///
/// A PDF without extractable text (e.g. a scanned document) yields an empty
/// sequence rather than an error.
pub fn extract_segments(
    data: &[u8],
    backend: &dyn PdfBackend,
    options: &SegmentOptions,
) -> Result<Vec<TextSegment>, ExtractionError> {
    if !is_pdf(data) {
        return Err(ExtractionError::InvalidDocument(
            "missing %PDF- header".to_string(),
        ));
    }
    let text = backend.extract_text(data)?;
    let segments = segment_text(&text, options);
    if segments.is_empty() {
        tracing::warn!("no text extracted, document may be scanned or image-only");
    }
    tracing::debug!(segments = segments.len(), granularity = %options.granularity, "segmented document");
    Ok(segments)
}
