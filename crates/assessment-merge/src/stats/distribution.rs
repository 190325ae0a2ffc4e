//! Frequency counts over categorical columns.

use crate::table::Table;
use crate::types::{Cell, Distribution, DistributionEntry};
use crate::utils::round_to;
use std::collections::HashMap;

/// Count the distinct labels of a column, most frequent first.
///
/// Blank cells are counted under [`BLANK_LABEL`](crate::types::BLANK_LABEL).
/// Labels with equal counts keep the order in which they first appear, so
/// the result does not depend on hashing. Returns `None` if the column does
/// not exist.
pub fn value_counts(table: &Table, column: &str) -> Option<Vec<(String, usize)>> {
    let cells = table.column(column)?;
    Some(count_labels(cells.map(Cell::category_label)))
}

/// Count labels in first-seen order, then sort by descending count.
pub(crate) fn count_labels(labels: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for label in labels {
        match index.get(&label) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                index.insert(label.clone(), counts.len());
                counts.push((label, 1));
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

impl Distribution {
    /// Build the distribution of one column of `table`.
    ///
    /// Percentages are relative to the full row count of the table.
    pub fn from_column(table: &Table, column: &str) -> Option<Self> {
        let counts = value_counts(table, column)?;
        let total = table.height();

        let entries = counts
            .into_iter()
            .map(|(category, count)| {
                let percentage = if total > 0 {
                    round_to(count as f64 / total as f64 * 100.0, 2)
                } else {
                    0.0
                };
                DistributionEntry {
                    category,
                    count,
                    percentage,
                }
            })
            .collect();

        Some(Self {
            column: column.to_string(),
            entries,
        })
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::columns::OVERALL_RISK;
    use crate::types::{BLANK_LABEL, FlatRow};
    use pretty_assertions::assert_eq;

    fn table_with(column: &str, values: &[Cell]) -> Table {
        values
            .iter()
            .map(|v| {
                let mut row = FlatRow::new();
                row.insert(column, v.clone());
                row
            })
            .collect()
    }

    #[test]
    fn test_risk_distribution_percentages() {
        let table = table_with(
            OVERALL_RISK,
            &[Cell::from("high"), Cell::from("low"), Cell::from("high")],
        );
        let dist = Distribution::from_column(&table, OVERALL_RISK).unwrap();

        assert_eq!(
            dist.entries,
            vec![
                DistributionEntry {
                    category: "high".to_string(),
                    count: 2,
                    percentage: 66.67
                },
                DistributionEntry {
                    category: "low".to_string(),
                    count: 1,
                    percentage: 33.33
                },
            ]
        );
        assert_eq!(dist.total(), 3);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let table = table_with(
            OVERALL_RISK,
            &[Cell::from("mid"), Cell::from("low"), Cell::from("high")],
        );
        let counts = value_counts(&table, OVERALL_RISK).unwrap();
        let labels: Vec<&str> = counts.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["mid", "low", "high"]);
    }

    #[test]
    fn test_blank_values_counted() {
        let table = table_with(OVERALL_RISK, &[Cell::Empty, Cell::from("low"), Cell::Empty]);
        let counts = value_counts(&table, OVERALL_RISK).unwrap();
        assert_eq!(counts[0], (BLANK_LABEL.to_string(), 2));
    }

    #[test]
    fn test_missing_column() {
        let table = table_with(OVERALL_RISK, &[Cell::from("low")]);
        assert!(Distribution::from_column(&table, "response_unknown").is_none());
    }
}
