//! Summary statistics over the assessment table.
//!
//! Each statistic is computed independently. A statistic whose column is
//! missing or holds no usable value is left out of the result rather than
//! reported as zero.

use super::distribution::value_counts;
use crate::flatten::columns::{
    ADL_IMPAIRMENT, AGE, ASSESSMENT_DATE, GENDER, MOST_LIKELY_TYPE, OVERALL_RISK,
};
use crate::table::Table;
use crate::types::{Cell, SummaryStatistics, SummaryValue};
use crate::utils::{parse_date, round_to};
use polars::prelude::*;
use tracing::{debug, warn};

pub const CASE_COUNT: &str = "case_count";
pub const EARLIEST_ASSESSMENT: &str = "earliest_assessment_date";
pub const LATEST_ASSESSMENT: &str = "latest_assessment_date";
pub const MEAN_AGE: &str = "mean_age";
pub const MEDIAN_AGE: &str = "median_age";
pub const MIN_AGE: &str = "min_age";
pub const MAX_AGE: &str = "max_age";
pub const MEAN_ADL: &str = "mean_adl_impairment";

// prefixes for per-category count metrics
const GENDER_PREFIX: &str = "gender_";
const RISK_PREFIX: &str = "risk_";
const TYPE_PREFIX: &str = "type_";

/// Aggregates of a numeric column over its valid values.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NumericStats {
    mean: Option<f64>,
    median: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

/// Compute every summary statistic for `table`.
pub fn compute_summary(table: &Table) -> SummaryStatistics {
    let mut summary = SummaryStatistics::new();

    summary.push(CASE_COUNT, SummaryValue::Count(table.height()));

    if let Some((earliest, latest)) = date_range(table, ASSESSMENT_DATE) {
        summary.push(EARLIEST_ASSESSMENT, SummaryValue::Text(earliest));
        summary.push(LATEST_ASSESSMENT, SummaryValue::Text(latest));
    }

    if let Some(stats) = numeric_stats(table, AGE) {
        push_number(&mut summary, MEAN_AGE, stats.mean.map(|m| round_to(m, 1)));
        push_number(&mut summary, MEDIAN_AGE, stats.median);
        push_number(&mut summary, MIN_AGE, stats.min);
        push_number(&mut summary, MAX_AGE, stats.max);
    }

    push_counts(&mut summary, table, GENDER, GENDER_PREFIX);
    push_counts(&mut summary, table, OVERALL_RISK, RISK_PREFIX);

    if let Some(stats) = numeric_stats(table, ADL_IMPAIRMENT) {
        push_number(&mut summary, MEAN_ADL, stats.mean.map(|m| round_to(m, 2)));
    }

    push_counts(&mut summary, table, MOST_LIKELY_TYPE, TYPE_PREFIX);

    debug!("Computed {} summary statistics", summary.len());
    summary
}

fn push_number(summary: &mut SummaryStatistics, name: &str, value: Option<f64>) {
    if let Some(value) = value {
        summary.push(name, SummaryValue::Number(value));
    }
}

fn push_counts(summary: &mut SummaryStatistics, table: &Table, column: &str, prefix: &str) {
    let Some(counts) = value_counts(table, column) else {
        return;
    };
    for (label, count) in counts {
        summary.push(format!("{prefix}{label}"), SummaryValue::Count(count));
    }
}

/// Earliest and latest parseable date in `column`, as `YYYY-MM-DD`.
fn date_range(table: &Table, column: &str) -> Option<(String, String)> {
    let dates: Vec<_> = table
        .column(column)?
        .filter_map(|cell| match cell {
            Cell::Text(s) => parse_date(s),
            _ => None,
        })
        .collect();

    let earliest = dates.iter().min()?;
    let latest = dates.iter().max()?;
    Some((
        earliest.format("%Y-%m-%d").to_string(),
        latest.format("%Y-%m-%d").to_string(),
    ))
}

/// The valid numeric values of `column` as a Float64 series.
///
/// Cells that do not coerce to a number become nulls and are dropped.
fn numeric_series(table: &Table, column: &str) -> Option<Series> {
    let values: Vec<Option<f64>> = table.column(column)?.map(Cell::as_number).collect();
    let series = Series::new(column.into(), values).drop_nulls();
    if series.is_empty() {
        None
    } else {
        Some(series)
    }
}

fn numeric_stats(table: &Table, column: &str) -> Option<NumericStats> {
    let series = numeric_series(table, column)?;
    match aggregate(&series) {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("Skipping statistics for '{}': {}", column, e);
            None
        }
    }
}

fn aggregate(series: &Series) -> PolarsResult<NumericStats> {
    let ca = series.f64()?;
    Ok(NumericStats {
        mean: ca.mean(),
        median: ca.median(),
        min: ca.min(),
        max: ca.max(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FlatRow;
    use pretty_assertions::assert_eq;

    fn table(rows: Vec<Vec<(&str, Cell)>>) -> Table {
        rows.into_iter()
            .map(|fields| {
                let mut row = FlatRow::new();
                for (name, cell) in fields {
                    row.insert(name, cell);
                }
                row
            })
            .collect()
    }

    fn names(summary: &SummaryStatistics) -> Vec<&str> {
        summary.entries().iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn test_case_count_always_present() {
        let summary = compute_summary(&table(vec![]));
        assert_eq!(summary.get(CASE_COUNT), Some(&SummaryValue::Count(0)));
    }

    #[test]
    fn test_age_statistics_ignore_unparseable() {
        let summary = compute_summary(&table(vec![
            vec![(AGE, Cell::Number(70.0))],
            vec![(AGE, Cell::from("81"))],
            vec![(AGE, Cell::from("unknown"))],
            vec![(AGE, Cell::Number(65.0))],
            vec![(AGE, Cell::Empty)],
        ]));

        assert_eq!(summary.get(MEAN_AGE), Some(&SummaryValue::Number(72.0)));
        assert_eq!(summary.get(MEDIAN_AGE), Some(&SummaryValue::Number(70.0)));
        assert_eq!(summary.get(MIN_AGE), Some(&SummaryValue::Number(65.0)));
        assert_eq!(summary.get(MAX_AGE), Some(&SummaryValue::Number(81.0)));
    }

    #[test]
    fn test_mean_age_rounded_and_even_median() {
        let summary = compute_summary(&table(vec![
            vec![(AGE, Cell::Number(70.0))],
            vec![(AGE, Cell::Number(71.0))],
            vec![(AGE, Cell::Number(71.0))],
        ]));
        assert_eq!(summary.get(MEAN_AGE), Some(&SummaryValue::Number(70.7)));

        let summary = compute_summary(&table(vec![
            vec![(AGE, Cell::Number(60.0))],
            vec![(AGE, Cell::Number(65.0))],
        ]));
        assert_eq!(summary.get(MEDIAN_AGE), Some(&SummaryValue::Number(62.5)));
    }

    #[test]
    fn test_age_statistics_omitted_when_nothing_parses() {
        let summary = compute_summary(&table(vec![
            vec![(AGE, Cell::from("unknown"))],
            vec![(AGE, Cell::Empty)],
        ]));
        assert!(summary.get(MEAN_AGE).is_none());
        assert!(summary.get(MEDIAN_AGE).is_none());
    }

    #[test]
    fn test_date_range() {
        let summary = compute_summary(&table(vec![
            vec![(ASSESSMENT_DATE, Cell::from("2024-03-10"))],
            vec![(ASSESSMENT_DATE, Cell::from("not a date"))],
            vec![(ASSESSMENT_DATE, Cell::from("2023-12-01T08:00:00"))],
            vec![(ASSESSMENT_DATE, Cell::Empty)],
        ]));

        assert_eq!(
            summary.get(EARLIEST_ASSESSMENT),
            Some(&SummaryValue::Text("2023-12-01".to_string()))
        );
        assert_eq!(
            summary.get(LATEST_ASSESSMENT),
            Some(&SummaryValue::Text("2024-03-10".to_string()))
        );
    }

    #[test]
    fn test_date_range_omitted_without_valid_dates() {
        let summary = compute_summary(&table(vec![vec![(ASSESSMENT_DATE, Cell::from("soon"))]]));
        assert!(summary.get(EARLIEST_ASSESSMENT).is_none());
        assert!(summary.get(LATEST_ASSESSMENT).is_none());
    }

    #[test]
    fn test_categorical_breakdowns_sorted_by_frequency() {
        let summary = compute_summary(&table(vec![
            vec![(GENDER, Cell::from("M")), (OVERALL_RISK, Cell::from("low"))],
            vec![(GENDER, Cell::from("F")), (OVERALL_RISK, Cell::from("high"))],
            vec![(GENDER, Cell::from("F")), (OVERALL_RISK, Cell::from("high"))],
        ]));

        let keys = names(&summary);
        let gender_keys: Vec<&str> = keys.iter().copied().filter(|k| k.starts_with("gender_")).collect();
        assert_eq!(gender_keys, vec!["gender_F", "gender_M"]);
        assert_eq!(summary.get("gender_F"), Some(&SummaryValue::Count(2)));
        assert_eq!(summary.get("risk_high"), Some(&SummaryValue::Count(2)));
        assert_eq!(summary.get("risk_low"), Some(&SummaryValue::Count(1)));
    }

    #[test]
    fn test_sentinel_type_is_counted() {
        let summary = compute_summary(&table(vec![
            vec![(MOST_LIKELY_TYPE, Cell::Empty)],
            vec![(MOST_LIKELY_TYPE, Cell::from("AD"))],
        ]));
        assert_eq!(summary.get("type_(blank)"), Some(&SummaryValue::Count(1)));
        assert_eq!(summary.get("type_AD"), Some(&SummaryValue::Count(1)));
    }

    #[test]
    fn test_adl_mean() {
        let summary = compute_summary(&table(vec![
            vec![(ADL_IMPAIRMENT, Cell::Number(1.0))],
            vec![(ADL_IMPAIRMENT, Cell::Number(2.0))],
            vec![(ADL_IMPAIRMENT, Cell::Number(2.0))],
        ]));
        assert_eq!(summary.get(MEAN_ADL), Some(&SummaryValue::Number(1.67)));
    }

    #[test]
    fn test_entry_order() {
        let summary = compute_summary(&table(vec![vec![
            (ASSESSMENT_DATE, Cell::from("2024-01-01")),
            (AGE, Cell::Number(70.0)),
            (GENDER, Cell::from("F")),
            (OVERALL_RISK, Cell::from("low")),
            (ADL_IMPAIRMENT, Cell::Number(0.5)),
            (MOST_LIKELY_TYPE, Cell::from("VaD")),
        ]]));

        assert_eq!(
            names(&summary),
            vec![
                CASE_COUNT,
                EARLIEST_ASSESSMENT,
                LATEST_ASSESSMENT,
                MEAN_AGE,
                MEDIAN_AGE,
                MIN_AGE,
                MAX_AGE,
                "gender_F",
                "risk_low",
                MEAN_ADL,
                "type_VaD",
            ]
        );
    }
}
