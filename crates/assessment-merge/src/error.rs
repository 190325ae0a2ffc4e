//! Custom error types for the assessment merge pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Only a few of
//! these are fatal for a run: a missing input directory and any failure while
//! writing output. Per-record problems are collected as skipped records and
//! per-statistic problems are logged and omitted, so they never surface here.
//!
//! Errors are serializable so that the CLI can embed them in JSON output.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the merge pipeline.
#[derive(Error, Debug)]
pub enum MergeError {
    /// The input directory does not exist.
    #[error("Input directory '{}' does not exist", .0.display())]
    InputDirNotFound(PathBuf),

    /// Discovery succeeded but no record could be parsed.
    #[error("No assessment records loaded from '{}'", .0.display())]
    NoRecordsLoaded(PathBuf),

    /// A single record could not be parsed.
    #[error("Failed to parse record '{file}': {reason}")]
    RecordParse { file: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The table does not fit into a worksheet.
    #[error("Sheet '{sheet}' exceeds the worksheet limit: {reason}")]
    WorkbookTooLarge { sheet: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Workbook writer error.
    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MergeError>,
    },
}

impl MergeError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MergeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InputDirNotFound(_) => "INPUT_DIR_NOT_FOUND",
            Self::NoRecordsLoaded(_) => "NO_RECORDS_LOADED",
            Self::RecordParse { .. } => "RECORD_PARSE_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::WorkbookTooLarge { .. } => "WORKBOOK_TOO_LARGE",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Xlsx(_) => "XLSX_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error ends the run without anything having gone wrong
    /// on disk (there was simply nothing to merge).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NoRecordsLoaded(_) | Self::RecordParse { .. } => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for MergeError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("MergeError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MergeError::Io(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MergeError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, rust_xlsxwriter::XlsxError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MergeError::Xlsx(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            MergeError::InputDirNotFound(PathBuf::from("data")).error_code(),
            "INPUT_DIR_NOT_FOUND"
        );
        assert_eq!(
            MergeError::InvalidConfig("stem".to_string()).error_code(),
            "INVALID_CONFIG"
        );
    }

    #[test]
    fn test_is_recoverable() {
        assert!(MergeError::NoRecordsLoaded(PathBuf::from("data")).is_recoverable());
        assert!(!MergeError::InputDirNotFound(PathBuf::from("data")).is_recoverable());
        assert!(
            !MergeError::Io(std::io::Error::other("disk full")).is_recoverable()
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = MergeError::RecordParse {
            file: "case_01.json".to_string(),
            reason: "expected value".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("RECORD_PARSE_FAILED"));
        assert!(json.contains("case_01.json"));
    }

    #[test]
    fn test_with_context() {
        let error = MergeError::Io(std::io::Error::other("denied"))
            .with_context("Writing reports/all_assessments_latest.csv");
        assert!(error.to_string().contains("all_assessments_latest.csv"));
        assert_eq!(error.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_missing_input_dir_message() {
        let error = MergeError::InputDirNotFound(PathBuf::from("data"));
        assert_eq!(error.to_string(), "Input directory 'data' does not exist");
    }
}
