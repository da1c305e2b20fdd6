use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Json,
    Markdown,
    Text,
    /// The HTML report laid out on A4 pages. Binary.
    Pdf,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Html,
            ExportFormat::Json,
            ExportFormat::Markdown,
            ExportFormat::Text,
            ExportFormat::Pdf,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Json => "JSON",
            Self::Markdown => "Markdown",
            Self::Text => "Plain Text",
            Self::Pdf => "PDF",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Text => "txt",
            Self::Pdf => "pdf",
        }
    }

    /// Binary formats can only be produced with `render_bytes` or written to a file.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "html" | "htm" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" | "plain" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!(
                "unknown export format '{}' (expected html, json, markdown, text or pdf)",
                other
            )),
        }
    }
}

/// Context printed in a report header.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub first_name: String,
    pub second_name: String,
    pub generated_at: DateTime<Local>,
}

impl ReportMeta {
    /// Metadata stamped with the current local time.
    pub fn new(first_name: impl Into<String>, second_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            second_name: second_name.into(),
            generated_at: Local::now(),
        }
    }
}
