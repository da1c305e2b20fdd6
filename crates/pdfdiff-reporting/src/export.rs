use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use pdfdiff_core::{
    ChangeEntry, Classification, ClassifiedSegment, ComparisonResult, InlineKind, InlineSpan,
    Summary, TextSegment, changes,
};

use crate::types::{ExportFormat, ReportMeta};

const ONLY_IN_SECOND: &str = "[Content only in second document]";
const ONLY_IN_FIRST: &str = "[Content only in first document]";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} reports are binary and cannot be rendered as text")]
    Binary(ExportFormat),
    #[cfg(feature = "pdf")]
    #[error("failed to render PDF: {0}")]
    Pdf(#[from] pdfdiff_pdf_mupdf::RenderError),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF export not compiled in (enable the `pdf` feature of pdfdiff-reporting)")]
    NoPdfSupport,
}

/// Render a comparison in one of the text formats.
///
/// Binary formats fail with [`ExportError::Binary`]; use [`render_bytes`].
pub fn render(
    result: &ComparisonResult,
    meta: &ReportMeta,
    format: ExportFormat,
) -> Result<String, ExportError> {
    Ok(match format {
        ExportFormat::Html => export_html(result, meta, Layout::Screen),
        ExportFormat::Json => export_json(result, meta)?,
        ExportFormat::Markdown => export_markdown(result, meta),
        ExportFormat::Text => export_text(result, meta),
        ExportFormat::Pdf => return Err(ExportError::Binary(format)),
    })
}

/// Render a comparison in any format, as bytes.
pub fn render_bytes(
    result: &ComparisonResult,
    meta: &ReportMeta,
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Pdf => export_pdf(result, meta),
        _ => render(result, meta, format).map(String::into_bytes),
    }
}

/// Render a comparison and write it to `path`.
pub fn export_results(
    result: &ComparisonResult,
    meta: &ReportMeta,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = render_bytes(result, meta, format)?;

    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(io_err)?;
    file.write_all(&content).map_err(io_err)?;
    tracing::info!(path = %path.display(), format = %format, "exported report");
    Ok(())
}

/// Default export file name, e.g. `comparison_report_20240215_090503.html`.
pub fn default_filename(format: ExportFormat, at: &DateTime<Local>) -> String {
    format!(
        "comparison_report_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

fn timestamp(meta: &ReportMeta) -> String {
    meta.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn change_description(entry: &ChangeEntry, segment: &ClassifiedSegment) -> String {
    match segment {
        ClassifiedSegment::Modified { similarity, .. } => {
            format!("{} ({:.0}% similar)", entry.label(), similarity * 100.0)
        }
        _ => entry.label(),
    }
}

fn word_line(s: &Summary) -> String {
    let delta = s.modified_word_delta();
    let sign = if delta > 0 { "+" } else { "" };
    format!(
        "{} words added, {} words removed, {}{} words in modified segments",
        s.added_words, s.removed_words, sign, delta
    )
}

// ── JSON ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonReport<'a> {
    first_document: &'a str,
    second_document: &'a str,
    generated_at: String,
    identical: bool,
    summary: &'a Summary,
    changes: Vec<ChangeEntry>,
    segments: &'a [ClassifiedSegment],
}

fn export_json(result: &ComparisonResult, meta: &ReportMeta) -> Result<String, ExportError> {
    let report = JsonReport {
        first_document: &meta.first_name,
        second_document: &meta.second_name,
        generated_at: meta.generated_at.to_rfc3339(),
        identical: result.is_identical(),
        summary: &result.summary,
        changes: changes(result),
        segments: &result.segments,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

// ── Markdown ────────────────────────────────────────────────────────

fn md_escape(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Quote possibly multi-line content as a Markdown blockquote.
fn md_quote(s: &str) -> String {
    s.lines()
        .map(|l| format!("> {}", md_escape(l)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn md_inline(spans: &[InlineSpan]) -> String {
    spans
        .iter()
        .map(|span| match span.kind {
            InlineKind::Equal => md_escape(&span.text),
            InlineKind::Delete => format!("~~{}~~", md_escape(&span.text)),
            InlineKind::Insert => format!("**{}**", md_escape(&span.text)),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn export_markdown(result: &ComparisonResult, meta: &ReportMeta) -> String {
    let s = &result.summary;
    let mut out = String::from("# PDF Comparison Report\n\n");
    out.push_str(&format!(
        "**First document:** {}  \n**Second document:** {}  \n**Generated:** {}\n\n",
        md_escape(&meta.first_name),
        md_escape(&meta.second_name),
        timestamp(meta),
    ));

    out.push_str("## Summary\n\n");
    out.push_str("| Change | Segments | Share |\n|---|---:|---:|\n");
    for (label, kind) in [
        ("Added", Classification::Added),
        ("Removed", Classification::Removed),
        ("Modified", Classification::Modified),
        ("Unchanged", Classification::Unchanged),
    ] {
        out.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            label,
            s.count(kind),
            s.percentage(kind)
        ));
    }
    out.push_str(&format!("| **Total** | **{}** | |\n\n", s.total));
    out.push_str(&format!("{}\n\n", word_line(s)));

    if result.is_identical() {
        out.push_str("_No differences found._\n");
        return out;
    }

    out.push_str("## Changes\n\n");
    for entry in changes(result) {
        let segment = &result.segments[entry.position];
        out.push_str(&format!("### {}\n\n", change_description(&entry, segment)));
        match segment {
            ClassifiedSegment::Added { new } => {
                out.push_str(&format!("{}\n\n", md_quote(&new.content)));
            }
            ClassifiedSegment::Removed { old } => {
                out.push_str(&format!("{}\n\n", md_quote(&old.content)));
            }
            ClassifiedSegment::Modified { old, new, inline, .. } => {
                out.push_str(&format!(
                    "**Before:**\n\n{}\n\n**After:**\n\n{}\n\n",
                    md_quote(&old.content),
                    md_quote(&new.content),
                ));
                if !inline.is_empty() {
                    out.push_str(&format!("**Word changes:** {}\n\n", md_inline(inline)));
                }
            }
            ClassifiedSegment::Unchanged { .. } => {}
        }
    }
    out
}

// ── Plain text ──────────────────────────────────────────────────────

fn indent(s: &str, prefix: &str) -> String {
    s.lines()
        .map(|l| format!("{}{}", prefix, l))
        .collect::<Vec<_>>()
        .join("\n")
}

fn export_text(result: &ComparisonResult, meta: &ReportMeta) -> String {
    let s = &result.summary;
    let mut out = String::from("PDF Comparison Report\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str(&format!(
        "First document:  {}\nSecond document: {}\nGenerated:       {}\n\n",
        meta.first_name,
        meta.second_name,
        timestamp(meta),
    ));
    out.push_str(&format!(
        "  {} added | {} removed | {} modified | {} unchanged | {} total\n",
        s.added, s.removed, s.modified, s.unchanged, s.total,
    ));
    out.push_str(&format!("  {}\n\n", word_line(s)));

    if result.is_identical() {
        out.push_str("No differences found.\n");
        return out;
    }

    for entry in changes(result) {
        let segment = &result.segments[entry.position];
        let title = change_description(&entry, segment);
        out.push_str(&format!("{}\n{}\n", title, "-".repeat(title.len())));
        match segment {
            ClassifiedSegment::Added { new } => {
                out.push_str(&format!("{}\n\n", indent(&new.content, "  + ")));
            }
            ClassifiedSegment::Removed { old } => {
                out.push_str(&format!("{}\n\n", indent(&old.content, "  - ")));
            }
            ClassifiedSegment::Modified { old, new, .. } => {
                out.push_str(&format!(
                    "{}\n{}\n\n",
                    indent(&old.content, "  - "),
                    indent(&new.content, "  + "),
                ));
            }
            ClassifiedSegment::Unchanged { .. } => {}
        }
    }
    out
}

// ── PDF ─────────────────────────────────────────────────────────────

#[cfg(feature = "pdf")]
fn export_pdf(result: &ComparisonResult, meta: &ReportMeta) -> Result<Vec<u8>, ExportError> {
    let html = export_html(result, meta, Layout::Print);
    Ok(pdfdiff_pdf_mupdf::html_to_pdf(&html)?)
}

#[cfg(not(feature = "pdf"))]
fn export_pdf(_result: &ComparisonResult, _meta: &ReportMeta) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::NoPdfSupport)
}

// ── HTML ────────────────────────────────────────────────────────────

/// Browser report or the simpler print variant fed to the PDF renderer,
/// which has no flexbox, grid or CSS variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Screen,
    Print,
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>PDF Comparison Report</title>
<style>
:root {
  --bg: #ffffff;
  --surface: #f9f9f9;
  --text: #333333;
  --dim: #888888;
  --added: #ccffcc;
  --removed: #ffcccc;
  --modified: #ffffcc;
  --placeholder: #f8f8f8;
  --border: #e0e0e0;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
  background: var(--bg);
  color: var(--text);
  line-height: 1.6;
  padding: 2rem;
}
h1 { margin-bottom: 0.5rem; font-size: 1.8rem; }
h2 { margin: 1.5rem 0 1rem; font-size: 1.3rem; }
.meta { color: var(--dim); margin-bottom: 1.5rem; }
.stats {
  display: flex;
  gap: 1rem;
  flex-wrap: wrap;
  margin-bottom: 1rem;
}
.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 8px;
  padding: 1rem 1.5rem;
  text-align: center;
  min-width: 120px;
}
.stat-card .number { font-size: 2rem; font-weight: bold; display: block; }
.stat-card .label { font-size: 0.85rem; color: var(--dim); }
.stat-card.added { background: var(--added); }
.stat-card.removed { background: var(--removed); }
.stat-card.modified { background: var(--modified); }
.words { color: var(--dim); margin-bottom: 1rem; }
.legend { display: flex; gap: 0.75rem; margin-bottom: 1.5rem; }
.legend span, .chip {
  padding: 0.4rem 0.9rem;
  border-radius: 20px;
  font-weight: 500;
}
.nav {
  display: flex;
  flex-wrap: wrap;
  gap: 0.5rem;
  background: var(--surface);
  border-radius: 8px;
  padding: 0.75rem;
  margin-bottom: 1.5rem;
}
.chip { color: var(--text); text-decoration: none; font-size: 0.85rem; }
.added-bg { background: var(--added); }
.removed-bg { background: var(--removed); }
.modified-bg { background: var(--modified); }
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.columns h2 { margin-top: 0; }
.seg {
  margin-bottom: 8px;
  padding: 6px 8px;
  border-radius: 5px;
  white-space: pre-wrap;
}
.seg.placeholder {
  background: var(--placeholder);
  color: var(--dim);
  font-style: italic;
}
del { background: #ff9999; text-decoration: line-through; }
ins { background: #99e699; text-decoration: none; }
.identical { background: var(--added); padding: 1rem; border-radius: 8px; }
footer { margin-top: 2rem; color: var(--dim); font-size: 0.85rem; text-align: center; }
</style>
</head>
<body>
"#;

const PRINT_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>PDF Comparison Report</title>
<style>
body { font-family: sans-serif; color: #333333; font-size: 10pt; }
h1 { font-size: 16pt; margin: 0 0 4pt 0; }
th { font-size: 11pt; text-align: left; padding: 0 4pt 6pt 4pt; }
.meta, .words { color: #888888; margin-bottom: 6pt; }
.stats { margin-bottom: 6pt; }
.stat-card { display: inline; padding: 2pt 6pt; margin-right: 4pt; border: 1px solid #e0e0e0; }
.stat-card .number { font-weight: bold; margin-right: 3pt; }
.legend { margin-bottom: 10pt; }
.legend span { padding: 2pt 6pt; margin-right: 4pt; }
.added-bg, .stat-card.added { background-color: #ccffcc; }
.removed-bg, .stat-card.removed { background-color: #ffcccc; }
.modified-bg, .stat-card.modified { background-color: #ffffcc; }
table.columns { width: 100%; border-collapse: collapse; }
table.columns td { width: 50%; vertical-align: top; padding: 0 4pt; }
.seg { margin: 0 0 6pt 0; padding: 3pt 4pt; }
.seg.placeholder { background-color: #f8f8f8; color: #888888; font-style: italic; }
del { background-color: #ff9999; text-decoration: line-through; }
ins { background-color: #99e699; text-decoration: none; }
.identical { background-color: #ccffcc; padding: 6pt; margin-bottom: 10pt; }
footer { margin-top: 12pt; color: #888888; font-size: 8pt; text-align: center; }
</style>
</head>
<body>
"#;

fn export_html(result: &ComparisonResult, meta: &ReportMeta, layout: Layout) -> String {
    let s = &result.summary;
    let entries = changes(result);
    let mut out = String::with_capacity(16384);
    out.push_str(match layout {
        Layout::Screen => HTML_HEAD,
        Layout::Print => PRINT_HEAD,
    });

    out.push_str("<h1>PDF Comparison Report</h1>\n");
    out.push_str(&format!(
        "<div class=\"meta\">{} &rarr; {}</div>\n",
        html_escape(&meta.first_name),
        html_escape(&meta.second_name),
    ));

    out.push_str("<div class=\"stats\">\n");
    write_stat_card(&mut out, "added", s.added, "Added");
    write_stat_card(&mut out, "removed", s.removed, "Removed");
    write_stat_card(&mut out, "modified", s.modified, "Modified");
    write_stat_card(&mut out, "unchanged", s.unchanged, "Unchanged");
    write_stat_card(&mut out, "total", s.total, "Total Segments");
    out.push_str("</div>\n");
    out.push_str(&format!("<div class=\"words\">{}</div>\n", word_line(s)));

    out.push_str(
        "<div class=\"legend\"><span class=\"added-bg\">Added Content</span>\
         <span class=\"removed-bg\">Removed Content</span>\
         <span class=\"modified-bg\">Modified Content</span></div>\n",
    );

    if result.is_identical() {
        out.push_str("<div class=\"identical\">No differences found.</div>\n");
    } else if layout == Layout::Screen {
        write_navigation(&mut out, result, &entries);
    }

    let blocks = segment_blocks(result, &entries);
    match layout {
        Layout::Screen => write_columns(&mut out, meta, &blocks),
        Layout::Print => write_rows(&mut out, meta, &blocks),
    }

    out.push_str(&format!(
        "\n<footer>Generated by <strong>pdfdiff</strong> &mdash; {}</footer>\n",
        timestamp(meta),
    ));
    out.push_str("</body>\n</html>\n");
    out
}

fn write_stat_card(out: &mut String, class: &str, value: usize, label: &str) {
    out.push_str(&format!(
        "<div class=\"stat-card {}\"><span class=\"number\">{}</span><span class=\"label\">{}</span></div>\n",
        class, value, label,
    ));
}

fn write_navigation(out: &mut String, result: &ComparisonResult, entries: &[ChangeEntry]) {
    out.push_str("<nav class=\"nav\">\n");
    for entry in entries {
        let (class, target) = match entry.kind {
            Classification::Added => ("added-bg", &entry.new_anchor),
            Classification::Removed => ("removed-bg", &entry.old_anchor),
            Classification::Modified => ("modified-bg", &entry.new_anchor),
            Classification::Unchanged => continue,
        };
        let Some(target) = target else { continue };
        out.push_str(&format!(
            "<a class=\"chip {}\" href=\"#{}\">{}</a>\n",
            class,
            target,
            html_escape(&change_description(entry, &result.segments[entry.position])),
        ));
    }
    out.push_str("</nav>\n");
}

/// One rendered block per column for every classified segment, in order.
fn segment_blocks(result: &ComparisonResult, entries: &[ChangeEntry]) -> Vec<(String, String)> {
    let mut next_entry = entries.iter().peekable();
    let mut blocks = Vec::with_capacity(result.segments.len());

    for (position, segment) in result.segments.iter().enumerate() {
        let entry = next_entry.next_if(|e| e.position == position);
        let old_id = entry.and_then(|e| e.old_anchor.as_deref());
        let new_id = entry.and_then(|e| e.new_anchor.as_deref());

        let pair = match segment {
            ClassifiedSegment::Unchanged { old, new } => (
                block(None, "", &html_escape(&old.content)),
                block(None, "", &html_escape(&new.content)),
            ),
            ClassifiedSegment::Removed { old } => (
                block(old_id, "removed-bg", &html_escape(&old.content)),
                placeholder(ONLY_IN_FIRST),
            ),
            ClassifiedSegment::Added { new } => (
                placeholder(ONLY_IN_SECOND),
                block(new_id, "added-bg", &html_escape(&new.content)),
            ),
            ClassifiedSegment::Modified {
                old, new, inline, ..
            } => (
                block(
                    old_id,
                    "modified-bg",
                    &html_inline(inline, old, InlineKind::Delete),
                ),
                block(
                    new_id,
                    "modified-bg",
                    &html_inline(inline, new, InlineKind::Insert),
                ),
            ),
        };
        blocks.push(pair);
    }
    blocks
}

/// Old and new side by side as two independent columns.
fn write_columns(out: &mut String, meta: &ReportMeta, blocks: &[(String, String)]) {
    let (old_col, new_col): (String, String) = blocks.iter().cloned().unzip();

    out.push_str("<div class=\"columns\">\n");
    out.push_str(&format!(
        "<section class=\"column\">\n<h2>{}</h2>\n{}</section>\n",
        html_escape(&meta.first_name),
        old_col
    ));
    out.push_str(&format!(
        "<section class=\"column\">\n<h2>{}</h2>\n{}</section>\n",
        html_escape(&meta.second_name),
        new_col
    ));
    out.push_str("</div>\n");
}

/// Old and new side by side as table rows, so each pair stays level on paper.
fn write_rows(out: &mut String, meta: &ReportMeta, blocks: &[(String, String)]) {
    out.push_str("<table class=\"columns\">\n");
    out.push_str(&format!(
        "<tr><th>{}</th><th>{}</th></tr>\n",
        html_escape(&meta.first_name),
        html_escape(&meta.second_name),
    ));
    for (old, new) in blocks {
        out.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>\n", old.trim_end(), new.trim_end()));
    }
    out.push_str("</table>\n");
}

fn block(id: Option<&str>, class: &str, body: &str) -> String {
    let id_attr = id.map(|id| format!(" id=\"{}\"", id)).unwrap_or_default();
    format!("<p{} class=\"seg {}\">{}</p>\n", id_attr, class, body)
}

fn placeholder(text: &str) -> String {
    format!("<p class=\"seg placeholder\">{}</p>\n", text)
}

/// One side of a modified pair with its word-level changes marked up.
///
/// `shown` is the kind that belongs to this side (`Delete` for the old
/// column, `Insert` for the new one); spans of the opposite kind are skipped.
fn html_inline(spans: &[InlineSpan], fallback: &TextSegment, shown: InlineKind) -> String {
    if spans.is_empty() {
        return html_escape(&fallback.content);
    }
    spans
        .iter()
        .filter_map(|span| match span.kind {
            InlineKind::Equal => Some(html_escape(&span.text)),
            InlineKind::Delete if shown == InlineKind::Delete => {
                Some(format!("<del>{}</del>", html_escape(&span.text)))
            }
            InlineKind::Insert if shown == InlineKind::Insert => {
                Some(format!("<ins>{}</ins>", html_escape(&span.text)))
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}
