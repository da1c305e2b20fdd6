//! HTML to PDF conversion through MuPDF's HTML layout engine.

use std::path::Path;

use mupdf::{Document, DocumentWriter, Matrix};
use thiserror::Error;

/// A4 in points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
/// Base font size in points.
const FONT_EM: f32 = 10.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to lay out HTML: {0}")]
    Layout(String),
    #[error("failed to write PDF: {0}")]
    Write(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lay out `html` on A4 pages and write them as a PDF file at `path`.
///
/// Returns the number of pages written.
pub fn write_html_as_pdf(html: &str, path: &Path) -> Result<usize, RenderError> {
    let mut document = Document::from_bytes(html.as_bytes(), "text/html")
        .map_err(|e| RenderError::Layout(e.to_string()))?;
    document
        .layout(PAGE_WIDTH, PAGE_HEIGHT, FONT_EM)
        .map_err(|e| RenderError::Layout(e.to_string()))?;

    let mut writer =
        DocumentWriter::new(path, "pdf", "").map_err(|e| RenderError::Write(e.to_string()))?;

    let mut pages = 0;
    for page in document
        .pages()
        .map_err(|e| RenderError::Layout(e.to_string()))?
    {
        let page = page.map_err(|e| RenderError::Layout(e.to_string()))?;
        let bounds = page
            .bounds()
            .map_err(|e| RenderError::Layout(e.to_string()))?;
        let device = writer
            .begin_page(bounds)
            .map_err(|e| RenderError::Write(e.to_string()))?;
        page.run(&device, &Matrix::IDENTITY)
            .map_err(|e| RenderError::Write(e.to_string()))?;
        writer
            .end_page(device)
            .map_err(|e| RenderError::Write(e.to_string()))?;
        pages += 1;
    }
    // Dropping the writer closes the file.
    drop(writer);

    tracing::debug!(pages, path = %path.display(), "rendered HTML to PDF");
    Ok(pages)
}

/// Lay out `html` and return the PDF bytes.
pub fn html_to_pdf(html: &str) -> Result<Vec<u8>, RenderError> {
    let file = tempfile::Builder::new()
        .prefix("pdfdiff-report-")
        .suffix(".pdf")
        .tempfile()?;
    write_html_as_pdf(html, file.path())?;
    Ok(std::fs::read(file.path())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MupdfBackend;
    use pdfdiff_core::PdfBackend;

    const REPORT: &str = "<!DOCTYPE html><html><body>\
        <h1>PDF Comparison Report</h1>\
        <p>Added paragraph</p>\
        </body></html>";

    #[test]
    fn html_to_pdf_produces_readable_pdf() {
        let bytes = html_to_pdf(REPORT).unwrap();
        assert!(pdfdiff_core::is_pdf(&bytes));

        let text = MupdfBackend::new().extract_text(&bytes).unwrap();
        assert!(text.contains("PDF Comparison Report"));
        assert!(text.contains("Added paragraph"));
    }

    #[test]
    fn write_html_as_pdf_counts_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let pages = write_html_as_pdf(REPORT, &path).unwrap();
        assert_eq!(pages, 1);
        assert!(path.exists());
    }

    #[test]
    fn write_html_as_pdf_bad_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.pdf");
        assert!(matches!(
            write_html_as_pdf(REPORT, &path),
            Err(RenderError::Write(_))
        ));
    }
}
