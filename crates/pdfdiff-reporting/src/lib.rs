pub mod export;
pub mod types;

pub use export::{ExportError, default_filename, export_results, render, render_bytes};
pub use types::{ExportFormat, ReportMeta};
