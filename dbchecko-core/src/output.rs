//! Plain-text table output for `select` results.
//!
//! Column widths are fixed by the header: every column is as wide as its
//! name, but at least [`MIN_COLUMN_WIDTH`]. Cells that do not fit are
//! abbreviated, except in the last column where they are printed in full.
//!
//! ```text
//! ID         || NAME
//! ================================================================================
//! 1          || Raptor
//! ```

use crate::Result;
use crate::error::DbCheckoError;
use crate::query::{ColumnInfo, RowStream};
use futures::TryStreamExt;
use std::io::Write;

/// Fill character for short cells and `NULL` values.
pub const PAD_CHARACTER: char = ' ';
/// Narrowest column in table output.
pub const MIN_COLUMN_WIDTH: usize = 10;
/// Text between adjacent cells.
pub const COLUMN_SEPARATOR: &str = " || ";
/// Character of the line under the header.
pub const SEPARATOR_CHARACTER: char = '=';
/// Length of the line under the header.
pub const SEPARATOR_LINE_LENGTH: usize = 80;
/// Marker appended to abbreviated cells.
pub const ELLIPSIS: &str = "...";

/// Shortens `value` to exactly `width` characters, ending in [`ELLIPSIS`].
///
/// Widths too small to hold any text before the ellipsis yield `width` dots.
pub fn abbreviate(value: &str, width: usize) -> String {
    let marker = ELLIPSIS.chars().count();
    if width <= marker {
        return ".".repeat(width);
    }

    let mut abbreviated: String = value.chars().take(width.saturating_sub(marker)).collect();
    abbreviated.push_str(ELLIPSIS);
    abbreviated
}

/// Right-pads `value` with [`PAD_CHARACTER`] to `width` characters.
pub fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    let mut padded = String::with_capacity(value.len().saturating_add(width.saturating_sub(len)));
    padded.push_str(value);
    padded.extend(std::iter::repeat_n(PAD_CHARACTER, width.saturating_sub(len)));
    padded
}

/// Formats header and rows for a fixed set of columns.
#[derive(Debug, Clone)]
pub struct TableFormatter {
    names: Vec<String>,
    widths: Vec<usize>,
}

impl TableFormatter {
    /// Creates a formatter, fixing each column's width from its metadata.
    pub fn new(columns: &[ColumnInfo]) -> Self {
        Self {
            names: columns.iter().map(|column| column.name.clone()).collect(),
            widths: columns.iter().map(ColumnInfo::display_width).collect(),
        }
    }

    /// Column widths in output order.
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Header line followed by the separator line, both newline-terminated.
    pub fn format_header(&self) -> String {
        let names: Vec<String> = self
            .names
            .iter()
            .map(|name| pad(name, MIN_COLUMN_WIDTH))
            .collect();

        let mut header = names.join(COLUMN_SEPARATOR);
        header.push('\n');
        header.extend(std::iter::repeat_n(SEPARATOR_CHARACTER, SEPARATOR_LINE_LENGTH));
        header.push('\n');
        header
    }

    /// Renders one cell of column `index`.
    ///
    /// `is_last` disables abbreviation so the final column is never cut.
    pub fn format_cell(&self, index: usize, value: Option<&str>, is_last: bool) -> String {
        let width = self.widths.get(index).copied().unwrap_or(MIN_COLUMN_WIDTH);

        match value {
            None => pad("", width),
            Some(value) if value.chars().count() > width => {
                if is_last {
                    value.to_string()
                } else {
                    abbreviate(value, width)
                }
            }
            Some(value) => pad(value, width),
        }
    }

    /// Renders a full newline-terminated row.
    pub fn format_row(&self, row: &[Option<String>]) -> String {
        let last = row.len().saturating_sub(1);
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(index, value)| self.format_cell(index, value.as_deref(), index == last))
            .collect();

        let mut line = cells.join(COLUMN_SEPARATOR);
        line.push('\n');
        line
    }

    /// Writes the header and separator line.
    ///
    /// # Errors
    /// Returns `Io` if the sink fails.
    pub fn write_header<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        out.write_all(self.format_header().as_bytes())
            .map_err(|e| DbCheckoError::io("Failed to write table header", e))
    }

    /// Writes one row.
    ///
    /// # Errors
    /// Returns `Io` if the sink fails.
    pub fn write_row<W: Write + ?Sized>(&self, out: &mut W, row: &[Option<String>]) -> Result<()> {
        out.write_all(self.format_row(row).as_bytes())
            .map_err(|e| DbCheckoError::io("Failed to write table row", e))
    }
}

/// Writes a complete table, pulling rows from the stream one at a time.
///
/// Returns the number of rows written.
///
/// # Errors
/// Returns `QueryFailed` if fetching a row fails and `Io` if writing fails.
/// Rows written before a fetch failure stay written, and the error says how
/// many there were.
pub async fn write_table<W: Write + ?Sized>(
    columns: &[ColumnInfo],
    mut rows: RowStream<'_>,
    out: &mut W,
) -> Result<u64> {
    let formatter = TableFormatter::new(columns);
    formatter.write_header(out)?;

    let mut count: u64 = 0;
    loop {
        let row = match rows.try_next().await {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => {
                // Best effort, the fetch error is what gets reported.
                let _ = out.flush();
                return Err(e.with_partial_output(count));
            }
        };
        formatter.write_row(out, &row)?;
        count = count.saturating_add(1);
    }

    out.flush()
        .map_err(|e| DbCheckoError::io("Failed to flush table output", e))?;

    tracing::debug!("Wrote {} row(s)", count);
    Ok(count)
}
