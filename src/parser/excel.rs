//! Excel file parser (xlsx, xlsm, xlsb, xls, ods)

use std::borrow::Cow;
use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, CellErrorType, Data, Range, Reader};

use crate::config::Config;
use crate::model::{CellValue, Table};

use super::{table_from_grid, Parser};

/// Parser for Excel files
pub struct ExcelParser;

impl Parser for ExcelParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

        // Get sheet name
        let sheet_name = if let Some(ref name) = config.sheet_name {
            name.clone()
        } else {
            // Use first sheet
            let sheets = workbook.sheet_names();
            if sheets.is_empty() {
                bail!("No sheets found in workbook");
            }
            log::info!("no sheet name given, using '{}'", sheets[0]);
            sheets[0].clone()
        };

        // Get the sheet range
        let range: Range<Data> = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        parse_range(&range, config)
            .with_context(|| format!("Failed to parse sheet: {}", sheet_name))
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(
            ext.to_lowercase().as_str(),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods"
        )
    }
}

fn parse_range(range: &Range<Data>, config: &Config) -> Result<Table> {
    if range.is_empty() {
        bail!("Empty sheet");
    }

    // Leading rows above the used range still count towards `skip_rows`
    let offset = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let skip_rows: Vec<usize> = config
        .skip_rows
        .iter()
        .filter_map(|&row| row.checked_sub(offset))
        .collect();

    let mut table = table_from_grid(range.rows(), &skip_rows, cell_to_string, convert_cell)?;
    for row in &mut table.rows {
        row.source_line += offset;
    }
    Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::String(Cow::Owned(s.clone())),
        Data::Float(f) => {
            // Check if it's actually an integer
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                CellValue::Int(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(ref dt) => {
            // calamine ExcelDateTime - use Display to convert and parse
            let s = format!("{}", dt);
            if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f") {
                CellValue::DateTime(datetime)
            } else if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f") {
                CellValue::DateTime(datetime)
            } else if let Ok(date) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
                CellValue::Date(date)
            } else {
                CellValue::String(Cow::Owned(s))
            }
        }
        Data::DateTimeIso(s) => {
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                CellValue::DateTime(dt)
            } else if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                CellValue::Date(d)
            } else {
                CellValue::String(Cow::Owned(s.clone()))
            }
        }
        Data::DurationIso(s) => CellValue::String(Cow::Owned(s.clone())),
        // "not available" is a second encoding of a missing value
        Data::Error(CellErrorType::NA) => CellValue::Float(f64::NAN),
        Data::Error(e) => CellValue::String(Cow::Owned(format!("#{:?}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Empty), CellValue::Null);
        assert_eq!(convert_cell(&Data::String("  ".into())), CellValue::from("  "));
        assert_eq!(convert_cell(&Data::String(" Bob ".into())), CellValue::from(" Bob "));
        assert_eq!(convert_cell(&Data::Float(31.0)), CellValue::Int(31));
        assert_eq!(convert_cell(&Data::Float(2.5)), CellValue::Float(2.5));
        assert!(convert_cell(&Data::Error(CellErrorType::NA)).is_missing());
        assert!(!convert_cell(&Data::Error(CellErrorType::Div0)).is_missing());
    }

    #[test]
    fn test_parse_range_with_offset_and_skip_rows() {
        // Used range starts on the second physical row
        let mut range: Range<Data> = Range::new((1, 0), (4, 1));
        range.set_value((1, 0), Data::String("Exported 2024".into()));
        range.set_value((2, 0), Data::String("id".into()));
        range.set_value((2, 1), Data::String("name".into()));
        range.set_value((3, 0), Data::Float(1.0));
        range.set_value((3, 1), Data::String("Alice".into()));
        range.set_value((4, 0), Data::Float(2.0));
        range.set_value((4, 1), Data::Error(CellErrorType::NA));

        let config = Config::default().with_skip_rows(vec![0, 1]);
        let table = parse_range(&range, &config).unwrap();

        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, "name"), Some(&CellValue::from("Alice")));
        assert!(table.cell(1, "name").unwrap().is_missing());
        assert_eq!(table.rows[0].source_line, 4);
    }
}
