use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use pdfdiff_core::config_file::{self, ConfigFile};
use pdfdiff_core::{Config, Granularity};
use pdfdiff_reporting::{ExportFormat, ReportMeta};

mod output;

use output::ColorMode;

/// PDF Comparison Tool - Compare the text of two PDF documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two documents and report additions, deletions and modifications
    Compare {
        /// The original (first) document
        first: PathBuf,

        /// The revised (second) document
        second: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
        format: OutputFormat,

        /// Write the report to a file. A directory gets a timestamped file name.
        /// PDF reports without this option go to the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Segment granularity (paragraph, line, sentence)
        #[arg(short, long)]
        granularity: Option<Granularity>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Also print unchanged segments (terminal format)
        #[arg(long)]
        context: bool,
    },

    /// Print the segments extracted from a single document
    Extract {
        /// Path to the PDF or text file
        file: PathBuf,

        /// Segment granularity (paragraph, line, sentence)
        #[arg(short, long)]
        granularity: Option<Granularity>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Terminal,
    Html,
    Json,
    Markdown,
    Text,
    Pdf,
}

impl OutputFormat {
    fn export_format(self) -> Option<ExportFormat> {
        match self {
            OutputFormat::Terminal => None,
            OutputFormat::Html => Some(ExportFormat::Html),
            OutputFormat::Json => Some(ExportFormat::Json),
            OutputFormat::Markdown => Some(ExportFormat::Markdown),
            OutputFormat::Text => Some(ExportFormat::Text),
            OutputFormat::Pdf => Some(ExportFormat::Pdf),
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let file_config = config_file::load_config();
    let env_granularity = std::env::var(config_file::GRANULARITY_ENV).ok();

    match cli.command {
        Command::Compare {
            first,
            second,
            format,
            output,
            granularity,
            no_color,
            context,
        } => {
            let config = resolve_config(&file_config, env_granularity, granularity);
            let color = resolve_color(&file_config, no_color, output.is_some());
            compare(&first, &second, &config, format, output, context, color)
        }
        Command::Extract {
            file,
            granularity,
            no_color,
        } => {
            let config = resolve_config(&file_config, env_granularity, granularity);
            let color = resolve_color(&file_config, no_color, false);
            extract(&file, &config, color)
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve configuration: CLI flags > env vars > config files > defaults.
fn resolve_config(
    file_config: &ConfigFile,
    env_granularity: Option<String>,
    granularity: Option<Granularity>,
) -> Config {
    file_config.resolve(env_granularity.as_deref(), granularity)
}

fn resolve_color(file_config: &ConfigFile, no_color: bool, to_file: bool) -> ColorMode {
    let enabled = !no_color
        && !to_file
        && file_config.color().unwrap_or(true)
        && std::io::stdout().is_terminal();
    ColorMode(enabled)
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn compare(
    first: &Path,
    second: &Path,
    config: &Config,
    format: OutputFormat,
    output: Option<PathBuf>,
    context: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let first_name = pdfdiff_ingest::display_name(first);
    let second_name = pdfdiff_ingest::display_name(second);

    let bar = spinner(format!("Comparing {} and {}...", first_name, second_name));
    let result = pdfdiff_ingest::compare_files(first, second, config);
    bar.finish_and_clear();
    let result = result?;

    tracing::info!(
        added = result.summary.added,
        removed = result.summary.removed,
        modified = result.summary.modified,
        granularity = %config.segmentation.granularity,
        "comparison complete"
    );

    let meta = ReportMeta::new(first_name, second_name);

    let (export_format, output) = route_output(format, output);

    match (export_format, output) {
        (Some(format), Some(path)) => {
            let path = if path.is_dir() {
                path.join(pdfdiff_reporting::default_filename(
                    format,
                    &meta.generated_at,
                ))
            } else {
                path
            };
            pdfdiff_reporting::export_results(&result, &meta, format, &path)?;
            println!("Report written to {}", path.display());
        }
        (Some(format), None) => {
            let content = pdfdiff_reporting::render(&result, &meta, format)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
        }
        (None, _) => {
            let mut stdout = std::io::stdout().lock();
            output::print_header(&mut stdout, &meta.first_name, &meta.second_name, color)?;
            output::print_comparison(&mut stdout, &result, context, color)?;
            output::print_summary(&mut stdout, &result.summary, color)?;
        }
    }

    Ok(())
}

/// Pick the rendered format and destination for a report.
///
/// Terminal output has no file form, so writing it to a file falls back to
/// plain text. Binary formats never go to stdout; without `-o` they land in
/// the current directory under a timestamped name.
fn route_output(
    format: OutputFormat,
    output: Option<PathBuf>,
) -> (Option<ExportFormat>, Option<PathBuf>) {
    match (format.export_format(), output) {
        (Some(f), None) if f.is_binary() => (Some(f), Some(PathBuf::from("."))),
        (Some(f), output) => (Some(f), output),
        (None, Some(path)) => (Some(ExportFormat::Text), Some(path)),
        (None, None) => (None, None),
    }
}

fn extract(file: &Path, config: &Config, color: ColorMode) -> anyhow::Result<()> {
    let segments = pdfdiff_ingest::load_segments(file, config)
        .with_context(|| format!("could not read {}", file.display()))?;

    let mut stdout = std::io::stdout().lock();
    output::print_segments(&mut stdout, &segments, color)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfdiff_core::config_file::SegmentationConfig;

    fn sentence_file() -> ConfigFile {
        ConfigFile {
            segmentation: Some(SegmentationConfig {
                granularity: Some(Granularity::Sentence),
                min_segment_chars: None,
            }),
            ..Default::default()
        }
    }

    fn parse_granularity(args: &[&str]) -> Option<Granularity> {
        match Cli::try_parse_from(args).unwrap().command {
            Command::Compare { granularity, .. } | Command::Extract { granularity, .. } => {
                granularity
            }
        }
    }

    #[test]
    fn test_flag_beats_env_and_file() {
        let flag = parse_granularity(&["pdfdiff", "compare", "a.pdf", "b.pdf", "-g", "line"]);
        let config = resolve_config(&sentence_file(), Some("paragraph".to_string()), flag);
        assert_eq!(config.segmentation.granularity, Granularity::Line);
    }

    #[test]
    fn test_env_beats_file() {
        let flag = parse_granularity(&["pdfdiff", "extract", "a.pdf"]);
        let config = resolve_config(&sentence_file(), Some("line".to_string()), flag);
        assert_eq!(config.segmentation.granularity, Granularity::Line);
    }

    #[test]
    fn test_file_then_default() {
        let config = resolve_config(&sentence_file(), None, None);
        assert_eq!(config.segmentation.granularity, Granularity::Sentence);

        let config = resolve_config(&ConfigFile::default(), None, None);
        assert_eq!(config.segmentation.granularity, Granularity::Paragraph);
    }

    #[test]
    fn test_invalid_env_value_is_ignored() {
        let config = resolve_config(&sentence_file(), Some("chapter".to_string()), None);
        assert_eq!(config.segmentation.granularity, Granularity::Sentence);
    }

    #[test]
    fn test_invalid_flag_is_rejected() {
        assert!(Cli::try_parse_from(["pdfdiff", "compare", "a", "b", "-g", "chapter"]).is_err());
    }

    #[test]
    fn test_route_output() {
        assert_eq!(route_output(OutputFormat::Terminal, None), (None, None));
        assert_eq!(
            route_output(OutputFormat::Terminal, Some(PathBuf::from("r.txt"))),
            (Some(ExportFormat::Text), Some(PathBuf::from("r.txt")))
        );
        assert_eq!(route_output(OutputFormat::Json, None), (Some(ExportFormat::Json), None));
        assert_eq!(
            route_output(OutputFormat::Pdf, None),
            (Some(ExportFormat::Pdf), Some(PathBuf::from(".")))
        );
    }

    #[test]
    fn test_pdf_format_flag() {
        let cli = Cli::try_parse_from(["pdfdiff", "compare", "a", "b", "--format", "pdf"]).unwrap();
        match cli.command {
            Command::Compare { format, .. } => assert_eq!(format, OutputFormat::Pdf),
            other => panic!("expected compare, got {:?}", other),
        }
    }
}
