//! Two-way frequency tables.

use crate::flatten::columns::{AGE, EDUCATION, GENDER, MOST_LIKELY_TYPE, OVERALL_RISK};
use crate::table::Table;
use crate::types::{Cell, CrossTab};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

pub const GENDER_BY_RISK: &str = "Gender x Risk";
pub const AGE_GROUP_BY_TYPE: &str = "Age Group x Type";
pub const EDUCATION_BY_RISK: &str = "Education x Risk";

/// Name of the derived age-group dimension.
pub const AGE_GROUP: &str = "age_group";

/// Age band of a patient.
///
/// Bands are `[0, 60)`, `[60, 70)`, `[70, 80)` and `[80, 120]`. Ages outside
/// `[0, 120]` or that cannot be read as a number fall into
/// [`AgeGroup::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeGroup {
    Under60,
    Sixties,
    Seventies,
    EightyPlus,
    Unknown,
}

impl AgeGroup {
    /// Every band in display order.
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Under60,
        AgeGroup::Sixties,
        AgeGroup::Seventies,
        AgeGroup::EightyPlus,
        AgeGroup::Unknown,
    ];

    pub fn from_age(age: Option<f64>) -> Self {
        match age {
            Some(a) if (0.0..60.0).contains(&a) => AgeGroup::Under60,
            Some(a) if (60.0..70.0).contains(&a) => AgeGroup::Sixties,
            Some(a) if (70.0..80.0).contains(&a) => AgeGroup::Seventies,
            Some(a) if (80.0..=120.0).contains(&a) => AgeGroup::EightyPlus,
            _ => AgeGroup::Unknown,
        }
    }

    pub fn from_cell(cell: &Cell) -> Self {
        Self::from_age(cell.as_number())
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Under60 => "<60",
            AgeGroup::Sixties => "60-69",
            AgeGroup::Seventies => "70-79",
            AgeGroup::EightyPlus => "80+",
            AgeGroup::Unknown => "unknown",
        }
    }

    fn rank(label: &str) -> usize {
        Self::ALL
            .iter()
            .position(|g| g.label() == label)
            .unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a dimension's labels are ordered in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelOrder {
    Lexicographic,
    AgeBands,
}

/// One axis of a cross-tab: the source column and how to label its cells.
#[derive(Clone, Copy)]
struct Dimension {
    name: &'static str,
    column: &'static str,
    label: fn(&Cell) -> String,
    order: LabelOrder,
}

impl Dimension {
    fn categorical(column: &'static str) -> Self {
        Self {
            name: column,
            column,
            label: Cell::category_label,
            order: LabelOrder::Lexicographic,
        }
    }

    fn age_group() -> Self {
        Self {
            name: AGE_GROUP,
            column: AGE,
            label: |cell| AgeGroup::from_cell(cell).label().to_string(),
            order: LabelOrder::AgeBands,
        }
    }

    fn labels(&self, table: &Table) -> Option<Vec<String>> {
        Some(table.column(self.column)?.map(self.label).collect())
    }

    /// Distinct labels in output order.
    fn ordered(&self, labels: &[String]) -> Vec<String> {
        let mut distinct: Vec<String> = labels.to_vec();
        distinct.sort();
        distinct.dedup();
        if self.order == LabelOrder::AgeBands {
            distinct.sort_by_key(|l| AgeGroup::rank(l));
        }
        distinct
    }
}

/// Cross-tabulate two dimensions of `table`.
///
/// Only labels that occur are listed. Returns `None` when either source
/// column is missing.
fn crosstab(table: &Table, name: &str, rows: Dimension, columns: Dimension) -> Option<CrossTab> {
    let row_values = rows.labels(table)?;
    let column_values = columns.labels(table)?;

    let row_labels = rows.ordered(&row_values);
    let column_labels = columns.ordered(&column_values);

    let row_pos: HashMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let column_pos: HashMap<&str, usize> = column_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let mut counts = vec![vec![0usize; column_labels.len()]; row_labels.len()];
    for (r, c) in row_values.iter().zip(&column_values) {
        if let (Some(&r), Some(&c)) = (row_pos.get(r.as_str()), column_pos.get(c.as_str())) {
            counts[r][c] += 1;
        }
    }

    Some(CrossTab {
        name: name.to_string(),
        row_dimension: rows.name.to_string(),
        column_dimension: columns.name.to_string(),
        row_labels,
        column_labels,
        counts,
    })
}

/// Build the standard cross-tabs, in sheet order.
///
/// Gender by risk, age group by most likely type, and education by risk.
/// An empty table yields no cross-tabs.
pub fn compute_crosstabs(table: &Table) -> Vec<CrossTab> {
    if table.height() == 0 {
        return Vec::new();
    }

    let layouts = [
        (
            GENDER_BY_RISK,
            Dimension::categorical(GENDER),
            Dimension::categorical(OVERALL_RISK),
        ),
        (
            AGE_GROUP_BY_TYPE,
            Dimension::age_group(),
            Dimension::categorical(MOST_LIKELY_TYPE),
        ),
        (
            EDUCATION_BY_RISK,
            Dimension::categorical(EDUCATION),
            Dimension::categorical(OVERALL_RISK),
        ),
    ];

    let tabs: Vec<CrossTab> = layouts
        .into_iter()
        .filter_map(|(name, rows, columns)| crosstab(table, name, rows, columns))
        .collect();

    debug!("Computed {} cross-tabulations", tabs.len());
    tabs
}
