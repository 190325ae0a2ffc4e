//! Report generation module.
//!
//! Each run produces the same pair of files in up to two generations:
//!
//! - `<stem>_<YYYYMMDD_HHMMSS>.csv` / `.xlsx`: a snapshot kept per run
//! - `<stem>_latest.csv` / `.xlsx`: overwritten on every run
//!
//! The CSV holds the full table behind a UTF-8 byte order mark. The workbook
//! adds the summary, the distributions and the cross-tabs as extra sheets.
//!
//! # Example
//!
//! ```rust,ignore
//! use assessment_merge::reporting::{ReportGenerator, RunReport};
//!
//! let generator = ReportGenerator::new(&config);
//! let written = generator.write_all(&analysis, &Local::now().naive_local())?;
//! generator.write_report_to_file(&RunReport::new(&config, &result, false))?;
//! ```

mod csv;
mod generator;
mod workbook;

pub use csv::{UTF8_BOM, write_csv};
pub use generator::{LATEST_SUFFIX, ReportGenerator, RunReport, TIMESTAMP_FORMAT};
pub use workbook::{FULL_DATA_SHEET, RISK_SHEET, SUMMARY_SHEET, TYPE_SHEET, write_workbook};
