//! CSV file parser

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{CellValue, Table};

use super::{table_from_grid, Parser};

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        if let Some(ref sheet) = config.sheet_name {
            log::debug!("ignoring sheet name '{}' for {}", sheet, path.display());
        }

        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };

        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut records = Vec::new();
        for (line_num, result) in csv_reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read CSV row {}", line_num + 1))?;
            records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        table_from_grid(&records, &config.skip_rows, |s: &String| s.clone(), |s: &String| {
            parse_cell_value(s)
        })
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Parse a string value into a CellValue with type inference.
///
/// Only an empty field is null; text that is not recognised as another
/// type, blank text included, keeps its surrounding whitespace.
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    // Check for empty/null
    if s.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "NA" {
        return CellValue::Null;
    }
    if trimmed.is_empty() {
        return CellValue::String(Cow::Owned(s.to_string()));
    }

    // Try parsing as boolean
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    // Try parsing as integer
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }

    // Try parsing as float ("NaN" lands here as the second missing encoding)
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }

    // Try parsing as date
    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }

    // Try parsing as datetime (ISO 8601)
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return CellValue::DateTime(dt);
    }

    // Default to string
    CellValue::String(Cow::Owned(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(""), CellValue::Null);
        assert_eq!(parse_cell_value("   "), CellValue::from("   "));
        assert_eq!(parse_cell_value("null"), CellValue::Null);
        assert_eq!(parse_cell_value("true"), CellValue::Bool(true));
        assert_eq!(parse_cell_value("false"), CellValue::Bool(false));
        assert_eq!(parse_cell_value(" 42 "), CellValue::Int(42));
        assert_eq!(parse_cell_value("3.25"), CellValue::Float(3.25));
        assert!(parse_cell_value("NaN").is_missing());
        assert_eq!(
            parse_cell_value("hello "),
            CellValue::String(Cow::Owned("hello ".to_string()))
        );
    }

    #[test]
    fn test_parse_file_with_skip_rows() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "exported by hand").unwrap();
        writeln!(file, "id,name,age").unwrap();
        writeln!(file, "1,Alice,30").unwrap();
        writeln!(file, "2,Bob").unwrap();

        let config = Config::default().with_skip_rows(vec![0]);
        let table = CsvParser.parse(file.path(), &config).unwrap();

        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name", "age"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, "age"), Some(&CellValue::Null));
        assert_eq!(table.rows[0].source_line, 3);
    }

    #[test]
    fn test_tab_separated() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(file, "sku\tqty").unwrap();
        writeln!(file, "A-1\t5").unwrap();

        let table = CsvParser.parse(file.path(), &Config::default()).unwrap();
        assert_eq!(table.cell(0, "qty"), Some(&CellValue::Int(5)));
    }
}
