//! Pipeline module.
//!
//! This module provides the merge pipeline and its pure analysis core.

mod analysis;
mod builder;
pub mod progress;

pub use analysis::{Analysis, analyze};
pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{ClosureProgressReporter, MergeStage, ProgressReporter, ProgressUpdate};
