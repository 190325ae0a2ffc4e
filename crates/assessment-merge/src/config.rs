//! Configuration types for the merge pipeline.
//!
//! The pipeline only needs to know where records come from and where reports
//! go. Everything else about the run (columns, statistics, sheet layout) is
//! fixed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory scanned for assessment exports.
pub const DEFAULT_INPUT_DIR: &str = "data";

/// Default directory receiving the generated reports.
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Default file stem of every generated report.
pub const DEFAULT_FILE_STEM: &str = "all_assessments";

/// Default extension of assessment exports.
pub const DEFAULT_INPUT_EXTENSION: &str = "json";

/// Configuration for the merge pipeline.
///
/// Use [`MergeConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use assessment_merge::config::MergeConfig;
///
/// let config = MergeConfig::builder()
///     .input_dir("exports")
///     .output_dir("reports")
///     .write_timestamped(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Directory scanned (non-recursively) for assessment exports.
    /// Default: "data"
    pub input_dir: PathBuf,

    /// File extension of assessment exports, without the dot.
    /// Default: "json"
    pub input_extension: String,

    /// Output directory for generated reports.
    /// Default: "reports"
    pub output_dir: PathBuf,

    /// Base name of every report file.
    /// Default: "all_assessments"
    pub file_stem: String,

    /// Whether to write the `<stem>_<YYYYMMDD_HHMMSS>` snapshot.
    /// Default: true
    pub write_timestamped: bool,

    /// Whether to overwrite the `<stem>_latest` snapshot.
    /// Default: true
    pub write_latest: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            input_extension: DEFAULT_INPUT_EXTENSION.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_stem: DEFAULT_FILE_STEM.to_string(),
            write_timestamped: true,
            write_latest: true,
        }
    }
}

impl MergeConfig {
    /// Create a new configuration builder.
    pub fn builder() -> MergeConfigBuilder {
        MergeConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.file_stem.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("file_stem".to_string()));
        }

        if self.file_stem.contains(['/', '\\']) {
            return Err(ConfigValidationError::InvalidFileStem(
                self.file_stem.clone(),
            ));
        }

        if self.input_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigValidationError::EmptyField(
                "input_extension".to_string(),
            ));
        }

        if !self.write_timestamped && !self.write_latest {
            return Err(ConfigValidationError::NoOutputGeneration);
        }

        Ok(())
    }

    /// The configured extension without a leading dot.
    pub fn extension(&self) -> &str {
        self.input_extension.trim_start_matches('.')
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("'{0}' must not be empty")]
    EmptyField(String),

    #[error("Invalid file stem '{0}' (must not contain path separators)")]
    InvalidFileStem(String),

    #[error("Both timestamped and latest outputs are disabled; nothing would be written")]
    NoOutputGeneration,
}

impl From<ConfigValidationError> for crate::error::MergeError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::MergeError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`MergeConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct MergeConfigBuilder {
    input_dir: Option<PathBuf>,
    input_extension: Option<String>,
    output_dir: Option<PathBuf>,
    file_stem: Option<String>,
    write_timestamped: Option<bool>,
    write_latest: Option<bool>,
}

impl MergeConfigBuilder {
    /// Set the directory scanned for assessment exports.
    pub fn input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(path.into());
        self
    }

    /// Set the extension of assessment exports (with or without the dot).
    pub fn input_extension(mut self, extension: impl Into<String>) -> Self {
        self.input_extension = Some(extension.into());
        self
    }

    /// Set the output directory for reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the base name of every report file.
    pub fn file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = Some(stem.into());
        self
    }

    /// Enable or disable the timestamped snapshot.
    pub fn write_timestamped(mut self, write: bool) -> Self {
        self.write_timestamped = Some(write);
        self
    }

    /// Enable or disable the `latest` snapshot.
    pub fn write_latest(mut self, write: bool) -> Self {
        self.write_latest = Some(write);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `MergeConfig` or an error if validation fails.
    pub fn build(self) -> Result<MergeConfig, ConfigValidationError> {
        let config = MergeConfig {
            input_dir: self
                .input_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
            input_extension: self
                .input_extension
                .unwrap_or_else(|| DEFAULT_INPUT_EXTENSION.to_string()),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            file_stem: self
                .file_stem
                .unwrap_or_else(|| DEFAULT_FILE_STEM.to_string()),
            write_timestamped: self.write_timestamped.unwrap_or(true),
            write_latest: self.write_latest.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
