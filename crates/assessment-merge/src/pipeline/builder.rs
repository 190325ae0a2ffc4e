//! Main merge pipeline.
//!
//! This module provides the `Pipeline` struct and builder that drive a run
//! from the input directory to the written reports.

use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::loader::{LoadOutcome, load_records};
use crate::pipeline::analysis::{Analysis, analyze_with_progress};
use crate::pipeline::progress::{
    ClosureProgressReporter, MergeStage, ProgressReporter, ProgressUpdate,
};
use crate::reporting::ReportGenerator;
use crate::types::MergeResult;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// The merge pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use assessment_merge::{MergeConfig, Pipeline};
///
/// let result = Pipeline::builder()
///     .config(MergeConfig::builder().input_dir("exports").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
///
/// println!("{} records merged", result.records_loaded);
/// ```
pub struct Pipeline {
    config: MergeConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    reporter: ReportGenerator,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Load, analyze and write every enabled report.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::NoRecordsLoaded`] if no file could be parsed; in
    /// that case nothing is written. Any write failure is returned as is.
    pub fn run(&self) -> Result<MergeResult> {
        self.finish(self.execute(true))
    }

    /// Load and analyze without writing anything.
    pub fn preview(&self) -> Result<MergeResult> {
        self.finish(self.execute(false))
    }

    fn finish(&self, outcome: Result<MergeResult>) -> Result<MergeResult> {
        match outcome {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Merged {} records",
                    result.records_loaded
                )));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                if e.is_recoverable() {
                    warn!("Merge stopped: {}", e);
                } else {
                    error!("Pipeline error: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn execute(&self, write: bool) -> Result<MergeResult> {
        let start_time = Instant::now();
        info!("Starting merge of {}", self.config.input_dir.display());

        self.report_progress(ProgressUpdate::new(
            MergeStage::Loading,
            0.0,
            "Loading record files...",
        ));
        let LoadOutcome {
            files_found,
            records,
            skipped,
        } = load_records(&self.config.input_dir, self.config.extension())?;

        if records.is_empty() {
            return Err(MergeError::NoRecordsLoaded(self.config.input_dir.clone()));
        }
        self.report_progress(ProgressUpdate::with_items(
            MergeStage::Loading,
            records.len(),
            files_found,
            format!("Loaded {} of {} files", records.len(), files_found),
        ));

        let analysis = analyze_with_progress(&records, &|update: ProgressUpdate| {
            self.report_progress(update)
        });

        let written_files = if write {
            self.write_reports(&analysis)?
        } else {
            info!("Dry run: no reports written");
            Vec::new()
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Merge finished in {} ms", duration_ms);

        Ok(MergeResult {
            records_found: files_found,
            records_loaded: records.len(),
            skipped,
            rows: analysis.table.height(),
            columns: analysis.table.width(),
            distributions: analysis.distributions(),
            summary: analysis.summary,
            crosstabs: analysis.crosstabs,
            written_files,
            duration_ms,
        })
    }

    fn write_reports(&self, analysis: &Analysis) -> Result<Vec<PathBuf>> {
        self.report_progress(ProgressUpdate::new(
            MergeStage::Writing,
            0.0,
            format!("Writing reports to {}", self.reporter.output_dir().display()),
        ));

        let timestamp = Local::now().naive_local();
        let written = self.reporter.write_all(analysis, &timestamp)?;

        self.report_progress(ProgressUpdate::new(
            MergeStage::Writing,
            1.0,
            format!("Wrote {} files", written.len()),
        ));
        Ok(written)
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<MergeConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: MergeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during a run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let reporter = ReportGenerator::new(&config);

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn pipeline_for(input: &TempDir, output: &TempDir) -> PipelineBuilder {
        let config = MergeConfig::builder()
            .input_dir(input.path())
            .output_dir(output.path())
            .build()
            .unwrap();
        Pipeline::builder().config(config)
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert!(pipeline.progress_reporter.is_none());
        assert_eq!(pipeline.config().file_stem, "all_assessments");
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = MergeConfig {
            write_latest: false,
            write_timestamped: false,
            ..MergeConfig::default()
        };
        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_pipeline_builder_with_progress_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.report_progress(ProgressUpdate::new(MergeStage::Loading, 0.5, "Test"));

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_with_no_records_writes_nothing() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("broken.json"), "{ not json").unwrap();

        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();
        let pipeline = pipeline_for(&input, &output)
            .on_progress(move |update| stages_clone.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        let err = pipeline.run().unwrap_err();
        assert!(matches!(err, MergeError::NoRecordsLoaded(_)));
        assert!(err.is_recoverable());
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
        assert_eq!(stages.lock().unwrap().last(), Some(&MergeStage::Failed));
    }

    #[test]
    fn test_run_reports_stages_and_writes() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(
            input.path().join("a.json"),
            r#"{"patientInfo": {"age": 70}, "results": {"overallRisk": "low"}}"#,
        )
        .unwrap();

        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();
        let pipeline = pipeline_for(&input, &output)
            .on_progress(move |update| stages_clone.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        let result = pipeline.run().unwrap();
        assert_eq!(result.records_loaded, 1);
        assert_eq!(result.written_files.len(), 4);

        let mut seen = stages.lock().unwrap().clone();
        seen.dedup();
        assert_eq!(
            seen,
            vec![
                MergeStage::Loading,
                MergeStage::Flattening,
                MergeStage::Summarizing,
                MergeStage::CrossTabulating,
                MergeStage::Writing,
                MergeStage::Complete,
            ]
        );
    }

    #[test]
    fn test_preview_writes_nothing() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("a.json"), r#"{"results": {"overallRisk": "high"}}"#).unwrap();

        let result = pipeline_for(&input, &output).build().unwrap().preview().unwrap();
        assert_eq!(result.records_loaded, 1);
        assert!(result.written_files.is_empty());
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }
}
