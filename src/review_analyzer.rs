//! # Product Review Analyzer
//!
//! A one-shot exploratory analysis of a product-review export. It loads the
//! tab-separated review table, scores the sentiment of every review, prints
//! descriptive statistics, renders six charts and closes with a fixed block of
//! insights and recommendations.
//!
//! ## Features
//!
//! - Tab-separated loading with column lookup by name
//! - Date parsing and empty-text filling for the review columns
//! - Lexicon-based sentiment polarity for original and translated text
//! - Monthly review counts, top products, per-language averages
//! - SVG charts (histograms, line chart, bar charts)
//!
//! ## Usage
//!
//! ```bash
//! # Analyze reviews.tsv in the current directory, charts go to "reports"
//! $ cargo run --release
//!
//! # Analyze a specific export
//! $ cargo run --release -- path/to/reviews.tsv
//!
//! # With custom output directory
//! $ cargo run --release -- path/to/reviews.tsv custom/output/dir
//! ```
//!
//! ## Generated Charts
//!
//! For each run, six SVG files are written with the input's basename included:
//!
//! 1. `[basename]_ratings_distribution_[timestamp].svg` - Histogram of rating values
//! 2. `[basename]_review_counts_over_time_[timestamp].svg` - Reviews per calendar month
//! 3. `[basename]_sentiment_distribution_[timestamp].svg` - Histogram of review sentiment
//! 4. `[basename]_top_products_[timestamp].svg` - The ten most reviewed products
//! 5. `[basename]_rating_by_language_[timestamp].svg` - Average rating per language
//! 6. `[basename]_sentiment_by_language_[timestamp].svg` - Average sentiment per language

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::analysis::{AnalysisReport, Statistics, analyze};
use crate::config::{AnalyzerConfig, DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_DIR};
use crate::error::{Result, ReviewError};
use crate::insights::write_insights;
use crate::render::{CHARTS, render_charts};
use crate::sentiment::{LexiconScorer, score_reviews};
use crate::table::{clean_reviews, load_reviews};

/// Command-line arguments for the review analyzer
#[derive(Parser, Debug)]
#[command(name = "review_analyzer")]
#[command(about = "Exploratory statistics, sentiment and charts for a product-review TSV export")]
#[command(version)]
struct Args {
    /// Tab-separated review export to analyze
    #[arg(default_value = DEFAULT_INPUT_FILE)]
    input: PathBuf,

    /// Directory where the chart files will be saved
    #[arg(default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

/// What one analyzer run produced.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    pub chart_paths: Vec<PathBuf>,
}

/// Analyzes a review export and writes the console report to `out`.
///
/// Runs the whole pipeline in order: load, clean, score, aggregate, print the
/// descriptive statistics, render the charts, and print the insights block.
///
/// # Arguments
///
/// * `config` - Input file, output directory, column schema and chart parameters
/// * `out` - Sink for the console report (statistics table, then insights)
///
/// # Returns
///
/// * `Result<AnalysisOutcome>` - The aggregates and the chart paths, or the first
///   load, parse, render, or I/O error
///
/// # Example
///
/// ```no_run
/// use review_analyzer_rust::{AnalyzerConfig, analyze_reviews};
///
/// fn main() -> Result<(), review_analyzer_rust::ReviewError> {
///     let config = AnalyzerConfig::new("reviews.tsv", "reports");
///     analyze_reviews(&config, &mut std::io::stdout())?;
///     Ok(())
/// }
/// ```
pub fn analyze_reviews<W: Write>(config: &AnalyzerConfig, out: &mut W) -> Result<AnalysisOutcome> {
    // Extract the basename from the input path
    let input_basename = extract_basename(&config.input)?;

    // Generate timestamp for unique chart filenames
    let timestamp = generate_timestamp()?;

    let raw = load_reviews(&config.input, &config.schema)?;
    let reviews = clean_reviews(raw, &config.schema)?;
    let scored = score_reviews(reviews, &LexiconScorer::new());

    let report = analyze(&scored, &config.schema, &config.charts);

    write_statistics_table(out, &report.statistics)?;

    let chart_paths = render_charts(
        &report,
        &config.output_dir,
        &input_basename,
        &timestamp,
        (config.charts.width, config.charts.height),
    )?;

    writeln!(out)?;
    write_insights(out)?;
    out.flush()?;

    Ok(AnalysisOutcome { report, chart_paths })
}

/// Writes the descriptive statistics with one column per numeric field and one
/// row per statistic, evenly spaced.
pub fn write_statistics_table<W: Write>(out: &mut W, statistics: &[Statistics]) -> io::Result<()> {
    writeln!(out, "Descriptive Statistics:")?;

    let widths: Vec<usize> = statistics
        .iter()
        .map(|s| s.column.len().max(12) + 2)
        .collect();

    write!(out, "{:<6}", "")?;
    for (stats, width) in statistics.iter().zip(&widths) {
        write!(out, "{:>width$}", stats.column, width = *width)?;
    }
    writeln!(out)?;

    let rows: [(&str, fn(&Statistics) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std_dev),
        ("min", |s| s.min),
        ("25%", |s| s.q1),
        ("50%", |s| s.median),
        ("75%", |s| s.q3),
        ("max", |s| s.max),
    ];

    for (label, value) in rows {
        write!(out, "{:<6}", label)?;
        for (stats, width) in statistics.iter().zip(&widths) {
            write!(out, "{:>width$.6}", value(stats), width = *width)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Extracts the basename from a file path without extension.
///
/// # Arguments
///
/// * `file_path` - The file path to extract basename from
///
/// # Returns
///
/// * `Result<String>` - The basename without extension, or a `DataLoad` error for
///   paths without a file name
fn extract_basename(file_path: impl AsRef<Path>) -> Result<String> {
    let path_ref = file_path.as_ref();

    let filename = path_ref
        .file_name()
        .ok_or_else(|| ReviewError::data_load(path_ref, "path has no file name"))?;

    let filename_str = filename.to_string_lossy();
    Ok(filename_str
        .split('.')
        .next()
        .filter(|stem| !stem.is_empty())
        .unwrap_or("reviews")
        .to_string())
}

/// Generates a timestamp string for unique filenames.
///
/// # Returns
///
/// * `Result<String>` - Seconds since the Unix epoch, or an error if the system
///   clock is before it
fn generate_timestamp() -> Result<String> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(io::Error::other)?;

    Ok(format!("{}", duration.as_secs()))
}

/// Logs where each chart went.
fn log_chart_paths(paths: &[PathBuf]) {
    info!("Generated {} chart files:", paths.len());
    for (i, (path, spec)) in paths.iter().zip(CHARTS.iter()).enumerate() {
        info!("  {}. {} - {}", i + 1, path.display(), spec.title);
    }
}

/// Main entry point for the review analyzer application.
///
/// Installs the log subscriber, parses the command line, and runs the analysis
/// with the console report on stdout. Logs go to stderr.
///
/// # Command Line Arguments
///
/// * `<program> [input_tsv_path] [output_directory]`
///
/// # Examples
///
/// ```bash
/// # Analyze ./reviews.tsv, charts in ./reports
/// review_analyzer
///
/// # Analyze a given export with a custom output directory
/// review_analyzer exports/reviews.tsv ./my_charts
/// ```
pub fn review_analyzer_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = AnalyzerConfig::new(args.input, args.output_dir);

    info!("Analyzing review export: {}", config.input.display());
    info!("Charts will be saved to: {}", config.output_dir.display());

    let stdout = io::stdout();
    let outcome = analyze_reviews(&config, &mut stdout.lock())
        .with_context(|| format!("Failed to analyze {}", config.input.display()))?;

    log_chart_paths(&outcome.chart_paths);
    Ok(())
}
