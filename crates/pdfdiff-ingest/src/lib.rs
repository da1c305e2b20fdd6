use std::path::{Path, PathBuf};

use thiserror::Error;

// Re-export domain types for convenience
pub use pdfdiff_core::{ComparisonResult, Config, DocumentSide, ExtractionError, TextSegment};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{name}: {source}")]
    Extraction {
        name: String,
        #[source]
        source: ExtractionError,
    },
    /// A failure while reading one side of a comparison. The inner error
    /// already names the file.
    #[error("{side} document: {source}")]
    Document {
        side: DocumentSide,
        #[source]
        source: Box<IngestError>,
    },
    #[cfg(not(feature = "pdf"))]
    #[error("{name}: PDF support not compiled in (enable the `pdf` feature of pdfdiff-ingest)")]
    NoPdfSupport { name: String },
}

impl IngestError {
    /// The side that failed, when the error came out of a two-document comparison.
    pub fn side(&self) -> Option<DocumentSide> {
        match self {
            IngestError::Document { side, .. } => Some(*side),
            _ => None,
        }
    }
}

/// Kind of input recognised from the file name and content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

/// Decide how to read a document.
///
/// PDF magic bytes always win; otherwise `.txt`, `.md` and `.text` files are
/// read as UTF-8 text. Anything else is rejected.
pub fn detect_kind(name: &str, data: &[u8]) -> Result<DocumentKind, ExtractionError> {
    if pdfdiff_core::is_pdf(data) {
        return Ok(DocumentKind::Pdf);
    }
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "pdf" => Err(ExtractionError::InvalidDocument(
            "file has .pdf extension but doesn't appear to be a valid PDF".to_string(),
        )),
        "txt" | "text" | "md" => Ok(DocumentKind::PlainText),
        _ => Err(ExtractionError::InvalidDocument(
            "unsupported file type, expected a PDF or plain text file".to_string(),
        )),
    }
}

/// Extract segments from an in-memory document.
///
/// Dispatches on [`detect_kind`]:
/// - PDF → MuPDF backend (requires the `pdf` feature)
/// - plain text → must be UTF-8 (a leading BOM is dropped), segmented directly
pub fn segments_from_bytes(
    name: &str,
    data: &[u8],
    config: &Config,
) -> Result<Vec<TextSegment>, IngestError> {
    let wrap = |source| IngestError::Extraction {
        name: name.to_string(),
        source,
    };

    match detect_kind(name, data).map_err(wrap)? {
        DocumentKind::PlainText => {
            let text = plain_text(data).map_err(wrap)?;
            Ok(pdfdiff_core::segment_text(text, &config.segmentation))
        }
        DocumentKind::Pdf => extract_pdf(name, data, config),
    }
}

fn plain_text(data: &[u8]) -> Result<&str, ExtractionError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    std::str::from_utf8(data).map_err(|e| {
        ExtractionError::InvalidDocument(format!(
            "not valid UTF-8 text (invalid byte at offset {})",
            e.valid_up_to()
        ))
    })
}

#[cfg(feature = "pdf")]
fn extract_pdf(name: &str, data: &[u8], config: &Config) -> Result<Vec<TextSegment>, IngestError> {
    let backend = pdfdiff_pdf_mupdf::MupdfBackend::from_config(config);
    pdfdiff_core::extract_segments(data, &backend, &config.segmentation).map_err(|source| {
        IngestError::Extraction {
            name: name.to_string(),
            source,
        }
    })
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(name: &str, _data: &[u8], _config: &Config) -> Result<Vec<TextSegment>, IngestError> {
    Err(IngestError::NoPdfSupport {
        name: name.to_string(),
    })
}

/// Load and segment a document from disk.
pub fn load_segments(path: &Path, config: &Config) -> Result<Vec<TextSegment>, IngestError> {
    let data = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let segments = segments_from_bytes(&display_name(path), &data, config)?;
    tracing::info!(path = %path.display(), segments = segments.len(), "loaded document");
    Ok(segments)
}

/// Compare two in-memory documents.
///
/// Both must extract before diffing; the error carries the failing side and
/// file name.
pub fn compare_bytes(
    first: (&str, &[u8]),
    second: (&str, &[u8]),
    config: &Config,
) -> Result<ComparisonResult, IngestError> {
    let old = segments_from_bytes(first.0, first.1, config)
        .map_err(|e| tag(DocumentSide::First, e))?;
    let new = segments_from_bytes(second.0, second.1, config)
        .map_err(|e| tag(DocumentSide::Second, e))?;
    Ok(pdfdiff_core::diff(&old, &new))
}

/// Compare two documents on disk.
pub fn compare_files(
    first: &Path,
    second: &Path,
    config: &Config,
) -> Result<ComparisonResult, IngestError> {
    let old = load_segments(first, config).map_err(|e| tag(DocumentSide::First, e))?;
    let new = load_segments(second, config).map_err(|e| tag(DocumentSide::Second, e))?;
    Ok(pdfdiff_core::diff(&old, &new))
}

fn tag(side: DocumentSide, source: IngestError) -> IngestError {
    IngestError::Document {
        side,
        source: Box::new(source),
    }
}

/// File name for messages, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
