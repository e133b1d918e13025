//! pdfoutline CLI - batch title and heading outline extraction

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::{
    discover_inputs, single_input, BatchOptions, BatchProcessor, BatchSummary, FileOutcome,
    FileStatus,
};
use pdfoutline::{CancellationToken, JsonFormat, LopdfExtractor, OutlineOptions};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Write a JSON title and heading outline for every PDF in a directory", long_about = None)]
struct Cli {
    /// Directory scanned for *.pdf files
    #[arg(long, value_name = "DIR", default_value = "./input", conflicts_with = "input_file")]
    input_dir: PathBuf,

    /// Process a single PDF instead of a directory
    #[arg(long, value_name = "FILE")]
    input_file: Option<PathBuf>,

    /// Directory receiving one <name>.json per input
    #[arg(long, value_name = "DIR", default_value = "./output")]
    output_dir: PathBuf,

    /// Number of worker threads (default: CPU count minus one)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Log verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Per-file time budget in seconds (0 disables)
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    timeout: u64,

    /// JSON file overriding classifier and title thresholds
    #[arg(long, value_name = "FILE", env = "PDFOUTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Also write one <name>.log.json processing event per input here
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Write compact instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,

    /// Hide the progress bar and the summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.into())
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let outline = load_outline_options(cli.config.as_deref())?;

    let inputs = match &cli.input_file {
        Some(file) => single_input(file)?,
        None => discover_inputs(&cli.input_dir)?,
    };
    if inputs.is_empty() {
        println!("{}", "No PDF files found".yellow());
    }

    let mut options = BatchOptions::new()
        .with_output_dir(&cli.output_dir)
        .with_timeout(Some(Duration::from_secs(cli.timeout)))
        .with_json_format(if cli.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        });
    if let Some(workers) = cli.workers {
        options = options.with_workers(workers);
    }
    if let Some(ref dir) = cli.log_dir {
        options = options.with_log_dir(dir);
    }

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        log::warn!("Interrupt received, finishing files already in progress");
        handler_token.cancel();
    })?;

    let processor =
        BatchProcessor::new(LopdfExtractor::new(), outline, options).with_cancellation(cancel);

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb
    };

    let summary = processor.run(&inputs, |outcome| {
        pb.set_message(progress_label(outcome));
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    if !cli.quiet {
        print_summary(&summary, &cli.output_dir);
    }

    Ok(())
}

fn load_outline_options(config: Option<&Path>) -> Result<OutlineOptions, Box<dyn std::error::Error>> {
    let Some(path) = config else {
        return Ok(OutlineOptions::default());
    };
    let json = fs::read_to_string(path)
        .map_err(|e| format!("cannot read config file {}: {}", path.display(), e))?;
    Ok(OutlineOptions::from_json(&json)?)
}

fn progress_label(outcome: &FileOutcome) -> String {
    let name = outcome
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match outcome.status {
        FileStatus::Succeeded { .. } => name,
        FileStatus::Failed { .. } => format!("{name} (failed)"),
        FileStatus::Cancelled => format!("{name} (cancelled)"),
    }
}

fn print_summary(summary: &BatchSummary, output_dir: &Path) {
    println!("{}", "Batch Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Files".bold(), summary.total);
    println!("{}: {}", "Succeeded".bold(), summary.succeeded.to_string().green());
    if summary.empty > 0 {
        println!("{}: {}", "  without text".bold(), summary.empty.to_string().yellow());
    }
    let failed = if summary.failed > 0 {
        summary.failed.to_string().red()
    } else {
        summary.failed.to_string().normal()
    };
    println!("{}: {}", "Failed".bold(), failed);
    if summary.cancelled > 0 {
        println!("{}: {}", "Cancelled".bold(), summary.cancelled.to_string().yellow());
    }
    println!("{}: {}", "Outline entries".bold(), summary.entries);
    println!("{}: {:.2}s", "Elapsed".bold(), summary.elapsed.as_secs_f64());
    println!("{}: {}", "Output".bold(), output_dir.display());

    if !summary.failures.is_empty() {
        println!();
        println!("{}", "Failures".red().bold());
        let last = summary.failures.len() - 1;
        for (i, failure) in summary.failures.iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            println!(
                "  {} {} [{}] {}",
                branch.dimmed(),
                failure.path.display(),
                failure.kind,
                failure.message
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pdfoutline"]).unwrap();
        assert_eq!(cli.input_dir, PathBuf::from("./input"));
        assert_eq!(cli.output_dir, PathBuf::from("./output"));
        assert_eq!(cli.timeout, 120);
        assert!(cli.log_level == LogLevel::Info);
        assert!(cli.workers.is_none());
    }

    #[test]
    fn test_input_file_conflicts_with_input_dir() {
        let result = Cli::try_parse_from([
            "pdfoutline",
            "--input-dir",
            "docs",
            "--input-file",
            "docs/a.pdf",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["pdfoutline", "--input-file", "docs/a.pdf"]).unwrap();
        assert_eq!(cli.input_file, Some(PathBuf::from("docs/a.pdf")));
    }

    #[test]
    fn test_log_level_names() {
        let cli = Cli::try_parse_from(["pdfoutline", "--log-level", "warning"]).unwrap();
        assert_eq!(log::LevelFilter::from(cli.log_level), log::LevelFilter::Warn);
        assert!(Cli::try_parse_from(["pdfoutline", "--log-level", "trace"]).is_err());
    }

    #[test]
    fn test_config_file_overrides_thresholds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_depth": 3, "isolation_gap_ratio": 0.5}}"#).unwrap();

        let options = load_outline_options(Some(file.path())).unwrap();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.isolation_gap_ratio, 0.5);
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_depth": 0}}"#).unwrap();
        assert!(load_outline_options(Some(file.path())).is_err());

        let missing = Path::new("/nonexistent/pdfoutline.json");
        assert!(load_outline_options(Some(missing)).is_err());
    }
}
