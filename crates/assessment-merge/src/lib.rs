//! Assessment Merge Library
//!
//! Merges per-patient dementia screening exports (one JSON document per
//! assessment) into a single table and produces summary reports from it.
//!
//! # Overview
//!
//! - **Loading**: discover every export in a directory, skipping unreadable ones
//! - **Flattening**: project each nested record onto a fixed set of columns plus
//!   one column per questionnaire answer
//! - **Table Building**: union the columns of all records into one rectangular table
//! - **Statistics**: case counts, age and ADL statistics, category breakdowns
//! - **Cross-Tabulation**: gender by risk, age group by dementia type, education by risk
//! - **Reporting**: a CSV with a UTF-8 byte order mark and a multi-sheet XLSX
//!   workbook, as a timestamped snapshot and a "latest" copy
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use assessment_merge::{MergeConfig, Pipeline};
//!
//! let config = MergeConfig::builder()
//!     .input_dir("data")
//!     .output_dir("reports")
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("Merged {} records into {} columns", result.records_loaded, result.columns);
//! for file in &result.written_files {
//!     println!("  {}", file.display());
//! }
//! ```
//!
//! # Analysis Without Files
//!
//! [`analyze`] runs the in-memory part of the pipeline on records that are
//! already loaded:
//!
//! ```rust,ignore
//! use assessment_merge::{RawRecord, analyze};
//!
//! let record = RawRecord::from_json_str("case.json", text)?;
//! let analysis = analyze(&[record]);
//! println!("{:?}", analysis.summary.get("mean_age"));
//! ```

pub mod category;
pub mod config;
pub mod error;
pub mod flatten;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod stats;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use category::DementiaType;
pub use config::{ConfigValidationError, MergeConfig, MergeConfigBuilder};
pub use error::{MergeError, ResultExt};
pub use flatten::{flatten_record, most_likely_type};
pub use loader::{LoadOutcome, RawRecord, discover_files, load_records};
pub use pipeline::{
    Analysis, ClosureProgressReporter, MergeStage, Pipeline, PipelineBuilder, ProgressReporter,
    ProgressUpdate, analyze,
};
pub use reporting::{ReportGenerator, RunReport, write_csv, write_workbook};
pub use stats::{AgeGroup, compute_crosstabs, compute_summary};
pub use table::{Table, TableBuilder};
pub use types::{
    Cell, CrossTab, Distribution, DistributionEntry, FlatRow, MergeResult, SkippedRecord,
    SummaryStatistics, SummaryValue,
};
pub use utils::{format_number, parse_date, parse_numeric_string, round_to};
