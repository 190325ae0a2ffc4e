use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::path::PathBuf;

use crate::utils::{format_number, parse_numeric_string};

/// Label used wherever an empty categorical value has to be shown.
pub const BLANK_LABEL: &str = "(blank)";

/// Label of the margin row and column of a [`CrossTab`].
pub const MARGIN_LABEL: &str = "Total";

// ============================================================================
// Table Values
// ============================================================================

/// A single scalar value of the flattened table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Missing value; rendered as an empty string.
    #[default]
    Empty,
    Bool(bool),
    /// A JSON integer, kept exact.
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Convert a JSON value into a cell without interpreting it.
    ///
    /// Integers stay exact; an unsigned one beyond `i64` keeps its JSON
    /// text. Arrays and objects have no scalar form and are kept as compact
    /// JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Cell::Integer(i),
                (None, _) if n.is_u64() => Cell::Text(n.to_string()),
                (None, Some(f)) => Cell::Number(f),
                (None, None) => Cell::Empty,
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Whether the cell carries no information.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Coerce the cell to a number, if it holds one.
    ///
    /// Text is parsed leniently (surrounding whitespace is ignored); booleans
    /// and blanks never count as numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_numeric_string(s),
            _ => None,
        }
    }

    /// Text form written to CSV.
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Cell::Integer(i) => i.to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Text form used as a category in counts and cross-tabs.
    pub fn category_label(&self) -> String {
        if self.is_blank() {
            BLANK_LABEL.to_string()
        } else {
            self.render()
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// The flat projection of one assessment record.
///
/// Field order is preserved: fixed fields in canonical order, then response
/// fields in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRow {
    fields: Vec<(String, Cell)>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Cell) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the row, yielding its fields in order.
    pub fn into_fields(self) -> Vec<(String, Cell)> {
        self.fields
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Value of a summary metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryValue {
    Count(usize),
    Number(f64),
    Text(String),
}

impl SummaryValue {
    pub fn render(&self) -> String {
        match self {
            SummaryValue::Count(c) => c.to_string(),
            SummaryValue::Number(n) => format_number(*n),
            SummaryValue::Text(s) => s.clone(),
        }
    }
}

/// Ordered metric name to value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStatistics {
    entries: Vec<(String, SummaryValue)>,
}

impl SummaryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: SummaryValue) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&SummaryValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn entries(&self) -> &[(String, SummaryValue)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SummaryStatistics {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One category of a [`Distribution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub category: String,
    pub count: usize,
    /// Share of all table rows, in percent, rounded to 2 decimals.
    pub percentage: f64,
}

/// Frequency breakdown of one categorical column, most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub column: String,
    pub entries: Vec<DistributionEntry>,
}

/// A two-dimensional frequency table with margins.
///
/// Only the data counts are stored; margins are computed on demand so they
/// always agree with the counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    /// Display name, also used as the sheet name.
    pub name: String,
    pub row_dimension: String,
    pub column_dimension: String,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    /// Count for a pair of labels, `None` if either label does not occur.
    pub fn count(&self, row_label: &str, column_label: &str) -> Option<usize> {
        let r = self.row_labels.iter().position(|l| l == row_label)?;
        let c = self.column_labels.iter().position(|l| l == column_label)?;
        Some(self.counts[r][c])
    }

    pub fn row_total(&self, row: usize) -> usize {
        self.counts.get(row).map(|r| r.iter().sum()).unwrap_or(0)
    }

    pub fn column_total(&self, column: usize) -> usize {
        self.counts
            .iter()
            .filter_map(|r| r.get(column))
            .sum()
    }

    /// Row total looked up by label.
    pub fn row_total_for(&self, row_label: &str) -> Option<usize> {
        self.row_labels
            .iter()
            .position(|l| l == row_label)
            .map(|r| self.row_total(r))
    }

    pub fn grand_total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// The table as a grid including the header row and both margins.
    ///
    /// The top-left cell holds `"<row dimension> / <column dimension>"`.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.row_labels.len() + 2);

        let mut header = vec![format!("{} / {}", self.row_dimension, self.column_dimension)];
        header.extend(self.column_labels.iter().cloned());
        header.push(MARGIN_LABEL.to_string());
        grid.push(header);

        for (r, label) in self.row_labels.iter().enumerate() {
            let mut line = vec![label.clone()];
            line.extend(self.counts[r].iter().map(|c| c.to_string()));
            line.push(self.row_total(r).to_string());
            grid.push(line);
        }

        let mut totals = vec![MARGIN_LABEL.to_string()];
        totals.extend((0..self.column_labels.len()).map(|c| self.column_total(c).to_string()));
        totals.push(self.grand_total().to_string());
        grid.push(totals);

        grid
    }
}

// ============================================================================
// Run Results
// ============================================================================

/// A source file that was discovered but left out of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub file_name: String,
    pub reason: String,
}

/// Outcome of a complete merge run.
#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    /// Files with a matching extension in the input directory.
    pub records_found: usize,
    /// Files parsed into records (and rows).
    pub records_loaded: usize,
    pub skipped: Vec<SkippedRecord>,
    pub rows: usize,
    pub columns: usize,
    pub summary: SummaryStatistics,
    /// Risk level and most likely type breakdowns, in that order.
    pub distributions: Vec<Distribution>,
    pub crosstabs: Vec<CrossTab>,
    /// Report files written, empty for a preview.
    pub written_files: Vec<PathBuf>,
    pub duration_ms: u64,
}
