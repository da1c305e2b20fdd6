use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("PDF is encrypted and cannot be opened without a password")]
    Encrypted,
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
}

/// Trait for PDF text extraction backends.
///
/// Implementors turn raw PDF bytes into plain text. Paragraph boundaries
/// should be emitted as blank lines so that segmentation in
/// [`crate::segment`] can recover them.
pub trait PdfBackend: Send + Sync {
    /// Extract the full text content of an in-memory PDF.
    fn extract_text(&self, data: &[u8]) -> Result<String, BackendError>;
}
