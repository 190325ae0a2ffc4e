//! CLI entry point for the assessment merge pipeline.

use anyhow::{Result, anyhow};
use assessment_merge::config::{DEFAULT_FILE_STEM, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use assessment_merge::{MergeConfig, MergeError, MergeResult, Pipeline, ReportGenerator, RunReport};
use clap::Parser;
use serde_json::json;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Merge dementia assessment exports into CSV and Excel reports",
    long_about = "Reads every JSON assessment export in a directory, flattens them into one table, \
                  and writes the table together with summary statistics and cross-tabulations.\n\n\
                  EXAMPLES:\n  \
                  # Merge ./data into ./reports\n  \
                  assessment-merge\n\n  \
                  # Custom directories\n  \
                  assessment-merge -i exports -o out\n\n  \
                  # Preview without writing files\n  \
                  assessment-merge --dry-run\n\n  \
                  # Machine-readable output\n  \
                  assessment-merge --json | jq .summary"
)]
struct Args {
    /// Directory containing the JSON assessment exports
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
    input: String,

    /// Output directory for reports
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: String,

    /// Base name of the report files
    #[arg(long, default_value = DEFAULT_FILE_STEM)]
    stem: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Do not write the <stem>_latest files
    #[arg(long)]
    no_latest: bool,

    /// Do not write the timestamped snapshot files
    #[arg(long)]
    no_timestamped: bool,

    /// Load and analyze the records without writing any report
    #[arg(long)]
    dry_run: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a JSON run report to the output directory
    ///
    /// The report will be saved as <stem>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = MergeConfig::builder()
        .input_dir(&args.input)
        .output_dir(&args.output)
        .file_stem(&args.stem)
        .write_latest(!args.no_latest)
        .write_timestamped(!args.no_timestamped)
        .build()?;

    let pipeline = Pipeline::builder()
        .config(config.clone())
        .on_progress(|update| {
            debug!(
                "[{:>3.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        })
        .build()?;

    let outcome = if args.dry_run {
        pipeline.preview()
    } else {
        pipeline.run()
    };

    match outcome {
        Ok(result) => handle_output(&result, &config, &args),
        Err(e) if e.is_recoverable() => handle_recoverable(&e, &args),
        Err(e) => Err(anyhow!("Merge failed: {}", e)),
    }
}

/// Nothing could be merged. This is reported, not treated as a failure.
fn handle_recoverable(error: &MergeError, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&json!({ "error": error }))?);
    } else {
        warn!("{}", error);
        println!("No reports written: {}", error);
    }
    Ok(())
}

/// Handle a successful run based on CLI flags.
///
/// - Default: print a human-readable summary to stdout
/// - `--json`: print the run report as JSON to stdout only (no logs)
/// - `--emit-report`: also write the run report to the output directory
fn handle_output(result: &MergeResult, config: &MergeConfig, args: &Args) -> Result<()> {
    let report = RunReport::new(config, result, args.dry_run);

    if args.emit_report {
        let report_path = ReportGenerator::new(config).write_report_to_file(&report)?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.dry_run {
        print_preview(result);
    } else {
        print_human_readable_summary(result, config);
    }
    Ok(())
}

/// Print what a run would produce.
///
/// Uses `println!` intentionally: this output is the purpose of `--dry-run`
/// and must be visible regardless of log level.
fn print_preview(result: &MergeResult) {
    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of merged reports");
    println!("{}\n", "=".repeat(80));

    println!("RECORDS");
    println!("{}", "-".repeat(40));
    println!("  Files found:  {}", result.records_found);
    println!("  Loaded:       {}", result.records_loaded);
    println!("  Skipped:      {}", result.skipped.len());
    println!("  Table shape:  {} rows x {} columns", result.rows, result.columns);
    println!();

    println!("SUMMARY");
    println!("{}", "-".repeat(40));
    for (metric, value) in result.summary.entries() {
        println!("  {:<32} {}", metric, value.render());
    }
    println!();

    for distribution in &result.distributions {
        println!("DISTRIBUTION: {}", distribution.column);
        println!("{}", "-".repeat(40));
        for entry in &distribution.entries {
            println!(
                "  {:<24} {:>6} {:>8.2}%",
                entry.category, entry.count, entry.percentage
            );
        }
        println!();
    }

    for tab in &result.crosstabs {
        println!("CROSS-TAB: {}", tab.name);
        println!("{}", "-".repeat(40));
        for line in tab.to_grid() {
            let cells: Vec<String> = line.iter().map(|c| format!("{:>12}", c)).collect();
            println!("  {}", cells.join(" "));
        }
        println!();
    }

    print_skipped(result);
    println!("{}", "=".repeat(80));
}

/// Print a human-readable summary of a completed run.
fn print_human_readable_summary(result: &MergeResult, config: &MergeConfig) {
    println!();
    println!("{}", "=".repeat(80));
    println!("MERGE COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} of {} files loaded)",
        config.input_dir.display(),
        result.records_loaded,
        result.records_found
    );
    println!(
        "Table:  {} rows x {} columns",
        result.rows, result.columns
    );
    println!("Duration: {}ms", result.duration_ms);
    println!();

    println!("Files written:");
    for path in &result.written_files {
        println!("  - {}", path.display());
    }
    println!();

    print_skipped(result);

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save a JSON run report");
    println!("{}", "=".repeat(80));
}

fn print_skipped(result: &MergeResult) {
    if result.skipped.is_empty() {
        return;
    }
    println!("Skipped files:");
    for skipped in &result.skipped {
        println!("  ! {}: {}", skipped.file_name, skipped.reason);
    }
    println!();
}
