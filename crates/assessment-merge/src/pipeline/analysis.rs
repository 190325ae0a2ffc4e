//! The in-memory part of a merge run: records in, table and aggregates out.

use crate::flatten::columns::{MOST_LIKELY_TYPE, OVERALL_RISK};
use crate::flatten::flatten_record;
use crate::loader::RawRecord;
use crate::pipeline::progress::{MergeStage, ProgressUpdate};
use crate::stats::{compute_crosstabs, compute_summary};
use crate::table::{Table, TableBuilder};
use crate::types::{CrossTab, Distribution, SummaryStatistics};
use tracing::{debug, info};

/// Everything derived from a batch of records.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub table: Table,
    pub summary: SummaryStatistics,
    pub risk_distribution: Option<Distribution>,
    pub type_distribution: Option<Distribution>,
    pub crosstabs: Vec<CrossTab>,
}

impl Analysis {
    /// The distributions that are present, risk first.
    pub fn distributions(&self) -> Vec<Distribution> {
        [&self.risk_distribution, &self.type_distribution]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// Flatten `records` and compute every aggregate.
///
/// Pure: reads nothing from disk and writes nothing. Records are processed
/// in the order given.
pub fn analyze(records: &[RawRecord]) -> Analysis {
    analyze_with_progress(records, &|_: ProgressUpdate| {})
}

pub(crate) fn analyze_with_progress(
    records: &[RawRecord],
    report: &dyn Fn(ProgressUpdate),
) -> Analysis {
    report(ProgressUpdate::with_items(
        MergeStage::Flattening,
        0,
        records.len(),
        "Flattening records...",
    ));
    let mut builder = TableBuilder::new();
    for record in records {
        builder.push(flatten_record(record));
    }
    let table = builder.build();
    info!("Built table: {} rows x {} columns", table.height(), table.width());
    report(ProgressUpdate::with_items(
        MergeStage::Flattening,
        records.len(),
        records.len(),
        format!("Built table with {} columns", table.width()),
    ));

    report(ProgressUpdate::new(
        MergeStage::Summarizing,
        0.0,
        "Computing summary statistics...",
    ));
    let summary = compute_summary(&table);
    let risk_distribution = Distribution::from_column(&table, OVERALL_RISK);
    let type_distribution = Distribution::from_column(&table, MOST_LIKELY_TYPE);
    debug!("Summary: {} metrics", summary.len());
    report(ProgressUpdate::new(
        MergeStage::Summarizing,
        1.0,
        "Summary statistics complete",
    ));

    report(ProgressUpdate::new(
        MergeStage::CrossTabulating,
        0.0,
        "Building cross-tabulations...",
    ));
    let crosstabs = compute_crosstabs(&table);
    report(ProgressUpdate::new(
        MergeStage::CrossTabulating,
        1.0,
        format!("Built {} cross-tabulations", crosstabs.len()),
    ));

    Analysis {
        table,
        summary,
        risk_distribution,
        type_distribution,
        crosstabs,
    }
}
