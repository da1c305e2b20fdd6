use mupdf::{Document, TextPageFlags};

use pdfdiff_core::{BackendError, Config, PdfBackend};

pub mod render;

pub use render::{RenderError, html_to_pdf, write_html_as_pdf};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency so
/// that the diff engine never depends on it, and the ingest and reporting
/// crates only through their `pdf` features.
///
/// Each text block MuPDF reports becomes one paragraph in the output
/// (blocks are separated by a blank line, lines within a block by a single
/// newline). Running headers and footers can be dropped by excluding a band
/// at the top and bottom of every page; both are off by default since page
/// furniture usually matches between two revisions anyway.
#[derive(Debug, Clone, Default)]
pub struct MupdfBackend {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    header_exclusion_ratio: Option<f32>,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend with the header/footer bands from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            footer_exclusion_ratio: config.footer_exclusion,
            header_exclusion_ratio: config.header_exclusion,
        }
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    fn open(&self, data: &[u8]) -> Result<Document, BackendError> {
        let mut document = Document::from_bytes(data, "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        // Documents with only an owner password open with the empty user password.
        if document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?
        {
            let unlocked = document
                .authenticate("")
                .map_err(|e| BackendError::OpenError(e.to_string()))?;
            if !unlocked {
                return Err(BackendError::Encrypted);
            }
            tracing::debug!("opened encrypted PDF with empty password");
        }
        Ok(document)
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_text(&self, data: &[u8]) -> Result<String, BackendError> {
        let document = self.open(data)?;

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let page_bounds = page
                .bounds()
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let page_height = page_bounds.y1 - page_bounds.y0;

            let header_threshold = self
                .header_exclusion_ratio
                .map(|r| page_bounds.y0 + page_height * r);
            let footer_threshold = self
                .footer_exclusion_ratio
                .map(|r| page_bounds.y1 - page_height * r);

            let mut blocks_text = Vec::new();
            for block in text_page.blocks() {
                let block_bounds = block.bounds();

                // Skip blocks entirely within the header band
                if let Some(threshold) = header_threshold
                    && block_bounds.y1 <= threshold
                {
                    continue;
                }

                // Skip blocks whose top edge is in the footer band
                if let Some(threshold) = footer_threshold
                    && block_bounds.y0 >= threshold
                {
                    continue;
                }

                let mut block_text = String::new();
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    block_text.push_str(&line_text);
                    block_text.push('\n');
                }
                if !block_text.trim().is_empty() {
                    blocks_text.push(block_text);
                }
            }
            pages_text.push(blocks_text.join("\n"));
        }

        tracing::debug!(pages = pages_text.len(), "extracted PDF text");
        Ok(pages_text.join("\n"))
    }
}
