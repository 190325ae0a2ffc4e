//! Record loading.
//!
//! Discovers assessment exports in a directory and parses them into
//! [`RawRecord`]s. A file that cannot be read or parsed is skipped with a
//! warning; only a missing input directory stops the run.

use crate::error::{MergeError, Result, ResultExt};
use crate::types::SkippedRecord;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One parsed assessment export.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Name of the source file (without directory).
    pub file_name: String,
    /// The full JSON document; always an object.
    pub document: Value,
}

impl RawRecord {
    /// Parse a record from its JSON text.
    ///
    /// The document must be a JSON object; anything else cannot carry the
    /// recognised sections and is rejected.
    pub fn from_json_str(file_name: impl Into<String>, text: &str) -> Result<Self> {
        let file_name = file_name.into();
        let document: Value =
            serde_json::from_str(text).map_err(|e| MergeError::RecordParse {
                file: file_name.clone(),
                reason: e.to_string(),
            })?;

        if !document.is_object() {
            return Err(MergeError::RecordParse {
                file: file_name,
                reason: "document is not a JSON object".to_string(),
            });
        }

        Ok(Self {
            file_name,
            document,
        })
    }

    /// Build a record from an already parsed value.
    pub fn new(file_name: impl Into<String>, document: Value) -> Self {
        Self {
            file_name: file_name.into(),
            document,
        }
    }
}

/// Records loaded from a directory plus the files that were left out.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Number of files with a matching extension.
    pub files_found: usize,
    pub records: Vec<RawRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// List the files in `dir` whose extension matches `extension`.
///
/// The scan is not recursive. Matching ignores ASCII case, and the result is
/// sorted by file name so that every run sees records in the same order.
pub fn discover_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MergeError::InputDirNotFound(dir.to_path_buf()));
    }

    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).context(format!("Reading {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load every matching record in `dir`.
pub fn load_records(dir: &Path, extension: &str) -> Result<LoadOutcome> {
    let files = discover_files(dir, extension)?;
    info!("Found {} record files in {}", files.len(), dir.display());

    let mut outcome = LoadOutcome {
        files_found: files.len(),
        ..Default::default()
    };

    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match load_record(&path, &file_name) {
            Ok(record) => {
                debug!("Loaded {}", file_name);
                outcome.records.push(record);
            }
            Err(e) => {
                warn!("Skipping {}: {}", file_name, e);
                outcome.skipped.push(SkippedRecord {
                    file_name,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Loaded {} records ({} skipped)",
        outcome.records.len(),
        outcome.skipped.len()
    );

    Ok(outcome)
}

fn load_record(path: &Path, file_name: &str) -> Result<RawRecord> {
    let text = fs::read_to_string(path).map_err(|e| MergeError::RecordParse {
        file: file_name.to_string(),
        reason: e.to_string(),
    })?;
    // Exports written by Windows tools may start with a byte-order mark.
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    RawRecord::from_json_str(file_name, text)
}
