use std::io::Write;

use owo_colors::OwoColorize;
use pdfdiff_core::{
    Classification, ClassifiedSegment, ComparisonResult, InlineKind, InlineSpan, Summary,
    TextSegment,
};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the two document names being compared.
pub fn print_header(
    w: &mut dyn Write,
    first: &str,
    second: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "---".red(), first.bold())?;
        writeln!(w, "{} {}", "+++".green(), second.bold())?;
    } else {
        writeln!(w, "--- {}", first)?;
        writeln!(w, "+++ {}", second)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print every change, and unchanged segments too when `context` is set.
pub fn print_comparison(
    w: &mut dyn Write,
    result: &ComparisonResult,
    context: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    if result.is_identical() {
        if color.enabled() {
            writeln!(w, "{}", "No differences found.".green())?;
        } else {
            writeln!(w, "No differences found.")?;
        }
        return Ok(());
    }

    for segment in &result.segments {
        match segment {
            ClassifiedSegment::Unchanged { new, .. } => {
                if !context {
                    continue;
                }
                let line = format!("  {}", truncate(&new.content, 120));
                if color.enabled() {
                    writeln!(w, "{}", line.dimmed())?;
                } else {
                    writeln!(w, "{}", line)?;
                }
            }
            ClassifiedSegment::Added { new } => {
                if color.enabled() {
                    writeln!(w, "{} {}", "+".green().bold(), new.content.green())?;
                } else {
                    writeln!(w, "+ {}", new.content)?;
                }
            }
            ClassifiedSegment::Removed { old } => {
                if color.enabled() {
                    writeln!(w, "{} {}", "-".red().bold(), old.content.red())?;
                } else {
                    writeln!(w, "- {}", old.content)?;
                }
            }
            ClassifiedSegment::Modified {
                old, new, inline, ..
            } => {
                if color.enabled() {
                    writeln!(
                        w,
                        "{} {} {} {}",
                        "~".yellow().bold(),
                        colored_side(inline, old, InlineKind::Delete),
                        "→".yellow(),
                        colored_side(inline, new, InlineKind::Insert),
                    )?;
                } else {
                    writeln!(w, "~ {} → {}", old.content, new.content)?;
                }
            }
        }
    }
    writeln!(w)?;
    Ok(())
}

/// One side of a modified pair, with that side's changed words highlighted.
fn colored_side(spans: &[InlineSpan], fallback: &TextSegment, shown: InlineKind) -> String {
    if spans.is_empty() {
        return fallback.content.clone();
    }
    spans
        .iter()
        .filter_map(|span| match span.kind {
            InlineKind::Equal => Some(span.text.clone()),
            InlineKind::Delete if shown == InlineKind::Delete => {
                Some(span.text.red().strikethrough().to_string())
            }
            InlineKind::Insert if shown == InlineKind::Insert => {
                Some(span.text.green().underline().to_string())
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print the final summary block.
pub fn print_summary(w: &mut dyn Write, summary: &Summary, color: ColorMode) -> std::io::Result<()> {
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }

    let rows = [
        ("Added:", Classification::Added),
        ("Removed:", Classification::Removed),
        ("Modified:", Classification::Modified),
    ];
    for (label, kind) in rows {
        let line = format!(
            "{} ({:.1}%)",
            summary.count(kind),
            summary.percentage(kind)
        );
        let label = if color.enabled() {
            match kind {
                Classification::Added => label.green().to_string(),
                Classification::Removed => label.red().to_string(),
                _ => label.yellow().to_string(),
            }
        } else {
            label.to_string()
        };
        writeln!(w, "  {} {}", label, line)?;
    }
    writeln!(w, "  Unchanged: {}", summary.unchanged)?;
    writeln!(w, "  Total segments: {}", summary.total)?;

    let delta = summary.modified_word_delta();
    let words = format!(
        "Words: +{} added, -{} removed, {}{} in modified segments",
        summary.added_words,
        summary.removed_words,
        if delta > 0 { "+" } else { "" },
        delta
    );
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "  {}", words.dimmed())?;
    } else {
        writeln!(w, "  {}", words)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print the segments of one document, numbered from 1.
pub fn print_segments(
    w: &mut dyn Write,
    segments: &[TextSegment],
    color: ColorMode,
) -> std::io::Result<()> {
    for segment in segments {
        let num = format!("[{}]", segment.index + 1);
        if color.enabled() {
            writeln!(w, "{} {}", num.dimmed(), segment.content)?;
        } else {
            writeln!(w, "{} {}", num, segment.content)?;
        }
    }
    writeln!(w)?;
    writeln!(w, "{} segments", segments.len())?;
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
