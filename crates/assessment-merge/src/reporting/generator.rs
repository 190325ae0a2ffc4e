use super::csv::write_csv;
use super::workbook::write_workbook;
use crate::config::MergeConfig;
use crate::error::{Result, ResultExt};
use crate::pipeline::Analysis;
use crate::types::{CrossTab, Distribution, MergeResult, SkippedRecord, SummaryStatistics};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Format of the timestamp embedded in snapshot file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Suffix of the snapshot that is overwritten on every run.
pub const LATEST_SUFFIX: &str = "latest";

// ============================================================================
// Run Report
// ============================================================================

/// Machine-readable summary of a merge run.
///
/// Printed to stdout with `--json` and written to `<stem>_report.json` with
/// `--emit-report`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_dir: String,
    pub output_dir: String,
    /// Whether reports were written or only previewed
    pub dry_run: bool,
    pub records_found: usize,
    pub records_loaded: usize,
    pub skipped: Vec<SkippedRecord>,
    pub rows: usize,
    pub columns: usize,
    pub duration_ms: u64,
    pub written_files: Vec<String>,
    pub summary: SummaryStatistics,
    pub distributions: Vec<Distribution>,
    pub crosstabs: Vec<CrossTab>,
}

impl RunReport {
    pub fn new(config: &MergeConfig, result: &MergeResult, dry_run: bool) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_dir: config.input_dir.display().to_string(),
            output_dir: config.output_dir.display().to_string(),
            dry_run,
            records_found: result.records_found,
            records_loaded: result.records_loaded,
            skipped: result.skipped.clone(),
            rows: result.rows,
            columns: result.columns,
            duration_ms: result.duration_ms,
            written_files: result
                .written_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            summary: result.summary.clone(),
            distributions: result.distributions.clone(),
            crosstabs: result.crosstabs.clone(),
        }
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Writes report files into the output directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    file_stem: String,
    write_timestamped: bool,
    write_latest: bool,
}

impl ReportGenerator {
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            file_stem: config.file_stem.clone(),
            write_timestamped: config.write_timestamped,
            write_latest: config.write_latest,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<stem>_<YYYYMMDD_HHMMSS>`
    pub fn timestamped_stem(&self, timestamp: &NaiveDateTime) -> String {
        format!("{}_{}", self.file_stem, timestamp.format(TIMESTAMP_FORMAT))
    }

    /// `<stem>_latest`
    pub fn latest_stem(&self) -> String {
        format!("{}_{}", self.file_stem, LATEST_SUFFIX)
    }

    /// Write every enabled report generation.
    ///
    /// The timestamped pair (CSV, XLSX) is written first, then the latest
    /// pair, which replaces any earlier latest files. Returns the paths
    /// written, in that order.
    pub fn write_all(&self, analysis: &Analysis, timestamp: &NaiveDateTime) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("Creating {}", self.output_dir.display()))?;

        let mut stems = Vec::with_capacity(2);
        if self.write_timestamped {
            stems.push(self.timestamped_stem(timestamp));
        }
        if self.write_latest {
            stems.push(self.latest_stem());
        }

        let mut written = Vec::with_capacity(stems.len() * 2);
        for stem in stems {
            written.extend(self.write_generation(analysis, &stem, timestamp)?);
        }
        Ok(written)
    }

    fn write_generation(
        &self,
        analysis: &Analysis,
        stem: &str,
        timestamp: &NaiveDateTime,
    ) -> Result<[PathBuf; 2]> {
        let csv_path = self.output_dir.join(format!("{}.csv", stem));
        write_csv(&analysis.table, &csv_path)?;
        info!("CSV saved: {}", csv_path.display());

        let xlsx_path = self.output_dir.join(format!("{}.xlsx", stem));
        write_workbook(analysis, &xlsx_path, timestamp)?;
        info!("Workbook saved: {}", xlsx_path.display());

        Ok([csv_path, xlsx_path])
    }

    /// Write a run report as pretty JSON to `<stem>_report.json`.
    pub fn write_report_to_file(&self, report: &RunReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("Creating {}", self.output_dir.display()))?;

        let report_path = self.output_dir.join(format!("{}_report.json", self.file_stem));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
