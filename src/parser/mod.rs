//! Parser layer for reading spreadsheet and CSV files

mod csv;
mod excel;

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::model::{CellValue, Column, Table};

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, config: &Config) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser), Box::new(ExcelParser)],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!(
            "Unsupported file format: {}",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
        )
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let parser = self.get_parser(path)?;
        let table = parser.parse(path, config)?;
        log::debug!(
            "read {} ({} columns, {} rows)",
            path.display(),
            table.column_count(),
            table.row_count()
        );
        Ok(table)
    }
}

/// Build a table from the raw rows of a sheet.
///
/// Rows whose 0-based position is listed in `skip_rows` are dropped, the
/// first remaining row becomes the header and the rest are data rows.
/// Empty header cells are named `ColumnN` after their 1-based position.
pub(crate) fn table_from_grid<T, R, I>(
    grid: I,
    skip_rows: &[usize],
    header_name: impl Fn(&T) -> String,
    convert: impl Fn(&T) -> CellValue,
) -> Result<Table>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[T]>,
{
    let mut rows = grid
        .into_iter()
        .enumerate()
        .filter(|(line, _)| !skip_rows.contains(line));

    let (_, header) = rows.next().context("No header row found")?;
    let columns: Vec<Column> = header
        .as_ref()
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = header_name(cell);
            let name = name.trim();
            Column::new(if name.is_empty() { format!("Column{}", i + 1) } else { name.to_string() }, i)
        })
        .collect();

    let mut table = Table::new(columns);
    for (line, row) in rows {
        let cells: Vec<CellValue> = row.as_ref().iter().map(&convert).collect();
        // Trailing blank lines show up as rows of nulls
        if cells.iter().all(CellValue::is_null) {
            continue;
        }
        table.add_row(cells, line + 1); // 1-indexed physical line
    }

    Ok(table)
}
