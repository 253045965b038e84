//! Excel workbook output, one worksheet per diff section

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::diff::TableDiff;
use crate::model::{CellValue, Table};

/// Writes every non-empty section to a worksheet named after it
pub struct XlsxOutput;

impl XlsxOutput {
    pub fn new() -> Self {
        Self
    }

    pub fn write_workbook(&self, diff: &TableDiff, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        for (section, table) in diff.sheets() {
            let sheet = workbook.add_worksheet();
            sheet.set_name(section.as_str())?;
            write_table(sheet, table, &header_format)
                .with_context(|| format!("Failed to write {} rows", section))?;
            log::debug!("{} sheet holds {} rows", section, table.row_count());
        }

        workbook
            .save(path)
            .with_context(|| format!("Failed to save workbook: {}", path.display()))?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

impl Default for XlsxOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn write_table(sheet: &mut Worksheet, table: &Table, header: &Format) -> Result<(), XlsxError> {
    for (col, name) in table.column_names().enumerate() {
        sheet.write_string_with_format(0, to_col(col)?, name, header)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, cell) in row.cells.iter().enumerate() {
            write_cell(sheet, row_num, to_col(col)?, cell)?;
        }
    }

    Ok(())
}

fn to_col(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

// Missing cells stay blank
fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> Result<(), XlsxError> {
    match cell {
        _ if cell.is_missing() => {}
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        CellValue::Int(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) if f.is_finite() => {
            sheet.write_number(row, col, *f)?;
        }
        other => {
            sheet.write_string(row, col, other.display())?;
        }
    }
    Ok(())
}
