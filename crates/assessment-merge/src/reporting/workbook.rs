//! Multi-sheet XLSX report.

use crate::error::{MergeError, Result, ResultExt};
use crate::pipeline::Analysis;
use crate::types::{Cell, CrossTab, Distribution, MARGIN_LABEL, SummaryStatistics, SummaryValue};
use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{
    ColNum, DocProperties, ExcelDateTime, Format, RowNum, Workbook, Worksheet,
};
use std::path::Path;
use tracing::debug;

pub const FULL_DATA_SHEET: &str = "Full Data";
pub const SUMMARY_SHEET: &str = "Summary";
pub const RISK_SHEET: &str = "Risk Distribution";
pub const TYPE_SHEET: &str = "Type Distribution";

const SUMMARY_HEADER: [&str; 2] = ["Metric", "Value"];
const RISK_HEADER: [&str; 3] = ["Risk Level", "Cases", "Percentage"];
const TYPE_HEADER: [&str; 3] = ["Dementia Type", "Cases", "Percentage"];

/// Largest integer magnitude a worksheet number holds exactly.
const MAX_EXACT_INTEGER: i64 = 1 << 53;

/// Write the full report workbook to `path`.
///
/// Sheets, in order: the full table, the summary, the risk and type
/// distributions, then one sheet per cross-tab named after it.
///
/// `created` is stored as the document creation time, so workbooks written
/// from the same analysis with the same `created` are byte-identical.
pub fn write_workbook(analysis: &Analysis, path: &Path, created: &NaiveDateTime) -> Result<()> {
    let mut workbook = Workbook::new();
    let properties = DocProperties::new().set_creation_datetime(&excel_datetime(created)?);
    workbook.set_properties(&properties);
    let bold = Format::new().set_bold();

    write_full_data(add_sheet(&mut workbook, FULL_DATA_SHEET)?, analysis, &bold)?;
    write_summary(add_sheet(&mut workbook, SUMMARY_SHEET)?, &analysis.summary, &bold)?;
    write_distribution(
        add_sheet(&mut workbook, RISK_SHEET)?,
        analysis.risk_distribution.as_ref(),
        &RISK_HEADER,
        &bold,
    )?;
    write_distribution(
        add_sheet(&mut workbook, TYPE_SHEET)?,
        analysis.type_distribution.as_ref(),
        &TYPE_HEADER,
        &bold,
    )?;
    for tab in &analysis.crosstabs {
        write_crosstab(add_sheet(&mut workbook, &tab.name)?, tab, &bold)?;
    }

    workbook
        .save(path)
        .context(format!("Saving {}", path.display()))?;
    debug!(
        "Wrote workbook with {} sheets to {}",
        4 + analysis.crosstabs.len(),
        path.display()
    );
    Ok(())
}

fn excel_datetime(timestamp: &NaiveDateTime) -> Result<ExcelDateTime> {
    // Years outside u16 are rejected by from_ymd below.
    let year = u16::try_from(timestamp.year()).unwrap_or(0);
    let datetime = ExcelDateTime::from_ymd(year, timestamp.month() as u8, timestamp.day() as u8)
        .and_then(|date| {
            date.and_hms(
                timestamp.hour() as u16,
                timestamp.minute() as u8,
                timestamp.second() as u8,
            )
        })
        .context(format!("Converting creation time {}", timestamp))?;
    Ok(datetime)
}

fn add_sheet<'a>(workbook: &'a mut Workbook, name: &str) -> Result<&'a mut Worksheet> {
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(name)
        .context(format!("Naming sheet '{}'", name))?;
    Ok(sheet)
}

/// Convert a zero-based position into worksheet coordinates.
fn position(sheet: &Worksheet, row: usize, col: usize) -> Result<(RowNum, ColNum)> {
    let too_large = |reason: String| MergeError::WorkbookTooLarge {
        sheet: sheet.name(),
        reason,
    };
    let r = RowNum::try_from(row).map_err(|_| too_large(format!("row {} out of range", row)))?;
    let c = ColNum::try_from(col).map_err(|_| too_large(format!("column {} out of range", col)))?;
    Ok((r, c))
}

fn write_header<S: AsRef<str>>(sheet: &mut Worksheet, titles: &[S], bold: &Format) -> Result<()> {
    for (col, title) in titles.iter().enumerate() {
        let (r, c) = position(sheet, 0, col)?;
        sheet.write_string_with_format(r, c, title.as_ref(), bold)?;
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: usize, col: usize, cell: &Cell) -> Result<()> {
    let (r, c) = position(sheet, row, col)?;
    match cell {
        Cell::Empty => {}
        Cell::Bool(b) => {
            sheet.write_boolean(r, c, *b)?;
        }
        Cell::Integer(i) if i.unsigned_abs() <= MAX_EXACT_INTEGER as u64 => {
            sheet.write_number(r, c, *i as f64)?;
        }
        Cell::Integer(i) => {
            sheet.write_string(r, c, i.to_string())?;
        }
        Cell::Number(n) => {
            sheet.write_number(r, c, *n)?;
        }
        Cell::Text(s) => {
            sheet.write_string(r, c, s)?;
        }
    }
    Ok(())
}

fn write_full_data(sheet: &mut Worksheet, analysis: &Analysis, bold: &Format) -> Result<()> {
    let table = &analysis.table;
    write_header(sheet, table.columns(), bold)?;
    for (i, row) in table.rows().iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            write_cell(sheet, i + 1, col, cell)?;
        }
    }
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, summary: &SummaryStatistics, bold: &Format) -> Result<()> {
    write_header(sheet, &SUMMARY_HEADER, bold)?;
    for (i, (metric, value)) in summary.entries().iter().enumerate() {
        let (r, _) = position(sheet, i + 1, 0)?;
        sheet.write_string(r, 0, metric)?;
        match value {
            SummaryValue::Count(n) => sheet.write_number(r, 1, *n as f64)?,
            SummaryValue::Number(n) => sheet.write_number(r, 1, *n)?,
            SummaryValue::Text(s) => sheet.write_string(r, 1, s)?,
        };
    }
    sheet.autofit();
    Ok(())
}

fn write_distribution(
    sheet: &mut Worksheet,
    distribution: Option<&Distribution>,
    header: &[&str],
    bold: &Format,
) -> Result<()> {
    write_header(sheet, header, bold)?;
    let Some(distribution) = distribution else {
        return Ok(());
    };
    for (i, entry) in distribution.entries.iter().enumerate() {
        let (r, _) = position(sheet, i + 1, 0)?;
        sheet.write_string(r, 0, &entry.category)?;
        sheet.write_number(r, 1, entry.count as f64)?;
        sheet.write_number(r, 2, entry.percentage)?;
    }
    sheet.autofit();
    Ok(())
}

fn write_crosstab(sheet: &mut Worksheet, tab: &CrossTab, bold: &Format) -> Result<()> {
    let mut header = vec![format!("{} / {}", tab.row_dimension, tab.column_dimension)];
    header.extend(tab.column_labels.iter().cloned());
    header.push(MARGIN_LABEL.to_string());
    write_header(sheet, &header, bold)?;

    let width = tab.column_labels.len();
    for (i, label) in tab.row_labels.iter().enumerate() {
        let (r, _) = position(sheet, i + 1, 0)?;
        sheet.write_string(r, 0, label)?;
        for (j, count) in tab.counts[i].iter().enumerate() {
            let (_, c) = position(sheet, 0, j + 1)?;
            sheet.write_number(r, c, *count as f64)?;
        }
        let (_, c) = position(sheet, 0, width + 1)?;
        sheet.write_number(r, c, tab.row_total(i) as f64)?;
    }

    let (r, _) = position(sheet, tab.row_labels.len() + 1, 0)?;
    sheet.write_string_with_format(r, 0, MARGIN_LABEL, bold)?;
    for j in 0..width {
        let (_, c) = position(sheet, 0, j + 1)?;
        sheet.write_number_with_format(r, c, tab.column_total(j) as f64, bold)?;
    }
    let (_, c) = position(sheet, 0, width + 1)?;
    sheet.write_number_with_format(r, c, tab.grand_total() as f64, bold)?;

    sheet.autofit();
    Ok(())
}
