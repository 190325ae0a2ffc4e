//! The rectangular assessment table.
//!
//! Source records do not share a schema: each one carries its own set of
//! questionnaire answers. [`TableBuilder`] collects flattened rows, keeps the
//! union of their columns in a stable order, and pads every row so that the
//! finished [`Table`] has a value in every cell.

use crate::error::{Result, ResultExt};
use crate::flatten::columns::FIXED_COLUMNS;
use crate::types::{Cell, FlatRow};
use polars::prelude::*;
use std::collections::HashMap;

/// Ordered set of column names.
#[derive(Debug, Clone, Default)]
struct ColumnSet {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColumnSet {
    /// Position of `name`, appending it if it has not been seen yet.
    fn intern(&mut self, name: &str) -> usize {
        if let Some(&pos) = self.index.get(name) {
            return pos;
        }
        let pos = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), pos);
        pos
    }
}

/// Collects flattened rows into a [`Table`].
///
/// The column set starts with [`FIXED_COLUMNS`]; any other column is appended
/// the first time a row carries it.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    columns: ColumnSet,
    rows: Vec<Vec<(usize, Cell)>>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut columns = ColumnSet::default();
        for name in FIXED_COLUMNS {
            columns.intern(name);
        }
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append one row.
    pub fn push(&mut self, row: FlatRow) {
        let cells = row
            .into_fields()
            .into_iter()
            .map(|(name, cell)| (self.columns.intern(&name), cell))
            .collect();
        self.rows.push(cells);
    }

    /// Number of rows pushed so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finish the table, filling every missing cell with [`Cell::Empty`].
    pub fn build(self) -> Table {
        let width = self.columns.names.len();
        let rows = self
            .rows
            .into_iter()
            .map(|cells| {
                let mut full = vec![Cell::Empty; width];
                for (pos, cell) in cells {
                    full[pos] = cell;
                }
                full
            })
            .collect();

        Table {
            columns: self.columns.names,
            index: self.columns.index,
            rows,
        }
    }
}

impl FromIterator<FlatRow> for Table {
    fn from_iter<I: IntoIterator<Item = FlatRow>>(iter: I) -> Self {
        let mut builder = TableBuilder::new();
        for row in iter {
            builder.push(row);
        }
        builder.build()
    }
}

/// A rectangular table of flattened records.
///
/// Read-only once built. Every row has exactly [`Table::width`] cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let pos = *self.index.get(name)?;
        Some(self.rows.iter().map(move |row| &row[pos]))
    }

    /// The cell at `row` in column `name`.
    pub fn cell(&self, row: usize, name: &str) -> Option<&Cell> {
        let pos = *self.index.get(name)?;
        self.rows.get(row).map(|r| &r[pos])
    }

    /// Convert to a polars DataFrame with every column rendered as text.
    ///
    /// Rendering keeps the exported values identical to the table regardless
    /// of how mixed a column's types are. Empty cells become nulls.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .enumerate()
            .map(|(pos, name)| {
                let values: Vec<Option<String>> = self
                    .rows
                    .iter()
                    .map(|row| match &row[pos] {
                        Cell::Empty => None,
                        cell => Some(cell.render()),
                    })
                    .collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();

        DataFrame::new(columns).context("Building table DataFrame")
    }
}
