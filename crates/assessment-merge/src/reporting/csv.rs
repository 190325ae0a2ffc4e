use crate::error::{Result, ResultExt};
use crate::table::Table;
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Byte order mark that lets spreadsheet applications detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write `table` as CSV: the UTF-8 BOM, a header row, then one line per row.
///
/// Every value is written in its rendered text form, so the file does not
/// depend on how polars would infer mixed-type columns.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut df = table.to_dataframe()?;

    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
    file.write_all(UTF8_BOM)?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)
        .context(format!("Writing {}", path.display()))?;

    debug!("Wrote {} rows to {}", table.height(), path.display());
    Ok(())
}
