use std::path::{Path, PathBuf};

use anyhow::Context;
use assertscan_core::{collect_test_files, report, scan_files, Config, ScanReport, Summary};
use clap::{ArgAction, Parser};
use console::style;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod fetch;
mod render;

/// Python test assertion extractor.
#[derive(Debug, Parser)]
#[command(
    name = "assertscan",
    about = "Extract test assertions from a Python repository into a CSV report."
)]
struct Args {
    /// Repository URL to clone, or a local directory to scan in place.
    #[arg(value_name = "REPO")]
    source: String,

    /// Path to config file (YAML).
    #[arg(long, default_value = "assertscan.yml")]
    config: PathBuf,

    /// CSV output path. Defaults to <repo>_assertions.csv.
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the summary as JSON instead of the human report.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Skip the text charts.
    #[arg(long, action = ArgAction::SetTrue)]
    no_charts: bool,

    /// Only log warnings and errors.
    #[arg(long, short, action = ArgAction::SetTrue)]
    quiet: bool,

    /// Log per-file progress.
    #[arg(long, short, action = ArgAction::SetTrue, conflicts_with = "quiet")]
    verbose: bool,

    /// Leave the cloned checkout on disk instead of deleting it.
    #[arg(long, action = ArgAction::SetTrue)]
    keep_clone: bool,
}

#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    csv: String,
    files_found: usize,
    files_scanned: usize,
    files_with_assertions: usize,
    skipped: &'a [assertscan_core::SkippedFile],
    summary: Summary,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);
    run(args)
}

fn init_logging(args: &Args) {
    let default_level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    // Dropping `repo` removes a temporary clone, including on early returns.
    let repo = fetch::fetch(&args.source, args.keep_clone)?;
    let root = repo.path();

    let files = collect_test_files(root, &cfg)
        .with_context(|| format!("Failed to walk {}", root.display()))?;
    if !args.json {
        println!("Found {} test files", files.len());
    }
    let scan = scan_files(root, &files)?;

    let output = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(format!("{}_assertions.csv", fetch::repo_name(&args.source)))
    });
    report::write_csv_file(&output, &scan.records)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), "results written");

    let summary = Summary::from_records(&scan.records).limited(&cfg.report);
    if args.json {
        let out = JsonOutput {
            csv: output.to_string_lossy().to_string(),
            files_found: files.len(),
            files_scanned: scan.files_scanned,
            files_with_assertions: scan.files_with_assertions,
            skipped: &scan.skipped,
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_human_report(&args, &scan, &summary, files.len(), &output);
    }
    Ok(())
}

fn print_human_report(
    args: &Args,
    scan: &ScanReport,
    summary: &Summary,
    file_count: usize,
    output: &Path,
) {
    render::print_skipped(scan);
    if scan.is_empty() {
        println!("{}", style("No assertions found in this repository").yellow());
        return;
    }
    println!(
        "{}",
        style(format!(
            "Found {} assertions in {} files",
            scan.records.len(),
            file_count
        ))
        .green()
    );
    println!("CSV written to {}\n", style(output.display()).bold());
    render::print_table(&scan.records);
    render::print_statistics(summary);
    if !args.no_charts {
        render::print_charts(summary);
    }
}
