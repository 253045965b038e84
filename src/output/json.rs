//! JSON output format

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;

use crate::diff::{CellChange, DiffStats, SchemaChange, TableDiff};
use crate::model::{CellValue, Table};

use super::OutputFormatter;

/// Pretty-printed JSON output formatter
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonSheet {
    columns: Vec<String>,
    rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Serialize)]
struct JsonCellChange<'a> {
    key: &'a str,
    column: &'a str,
    old_value: serde_json::Value,
    new_value: serde_json::Value,
}

#[derive(Serialize)]
struct JsonDiffOutput<'a> {
    old_file: String,
    new_file: String,
    key_columns: &'a [String],
    sheets: IndexMap<&'static str, JsonSheet>,
    changes: Vec<JsonCellChange<'a>>,
    schema_changes: &'a [SchemaChange],
    stats: &'a DiffStats,
}

fn cell_value_to_json(value: &CellValue) -> serde_json::Value {
    match value {
        CellValue::Null => serde_json::Value::Null,
        CellValue::Bool(b) => serde_json::Value::Bool(*b),
        CellValue::Int(i) => serde_json::json!(*i),
        // NaN has no JSON form and becomes null
        CellValue::Float(f) => serde_json::json!(*f),
        CellValue::String(s) => serde_json::Value::String(s.to_string()),
        CellValue::Date(d) => serde_json::Value::String(d.to_string()),
        CellValue::DateTime(dt) => serde_json::Value::String(dt.to_string()),
    }
}

fn table_to_sheet(table: &Table) -> JsonSheet {
    JsonSheet {
        columns: table.column_names().map(str::to_string).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| row.cells.iter().map(cell_value_to_json).collect())
            .collect(),
    }
}

fn change_to_json(change: &CellChange) -> JsonCellChange<'_> {
    JsonCellChange {
        key: &change.key,
        column: &change.column,
        old_value: cell_value_to_json(&change.old_value),
        new_value: cell_value_to_json(&change.new_value),
    }
}

impl OutputFormatter for JsonOutput {
    fn render(
        &self,
        diff: &TableDiff,
        old_path: &Path,
        new_path: &Path,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let output = JsonDiffOutput {
            old_file: old_path.display().to_string(),
            new_file: new_path.display().to_string(),
            key_columns: &diff.key_columns,
            sheets: diff
                .sheets()
                .map(|(section, table)| (section.as_str(), table_to_sheet(table)))
                .collect(),
            changes: diff.cell_changes.iter().map(change_to_json).collect(),
            schema_changes: &diff.schema_changes,
            stats: &diff.stats,
        };

        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff_tables;

    #[test]
    fn test_render_sections_and_changes() {
        let old = Table::with_headers(&["id", "age"])
            .push(vec![1i64.into(), 30i64.into()])
            .push(vec![2i64.into(), 25i64.into()]);
        let new = Table::with_headers(&["id", "age"]).push(vec![1i64.into(), 31i64.into()]);
        let diff = diff_tables(&old, &new, &["id".to_string()]).unwrap();

        let mut buf = Vec::new();
        JsonOutput::new()
            .render(&diff, Path::new("a.xlsx"), Path::new("b.xlsx"), &mut buf)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        let sheets = value["sheets"].as_object().unwrap();
        assert_eq!(sheets.len(), 2);
        assert!(sheets.contains_key("removed"));
        assert!(!sheets.contains_key("added"));
        assert_eq!(value["sheets"]["changed"]["rows"][0][1], "30 ---> 31");
        assert_eq!(value["changes"][0]["old_value"], 30);
        assert_eq!(value["stats"]["rows_removed"], 1);
    }
}
