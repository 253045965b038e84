//! One CSV file per diff section

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::diff::{DiffSection, TableDiff};
use crate::model::{CellValue, Table};

/// Writes each non-empty section to `<stem>_<section>.csv` next to the
/// output path
pub struct CsvOutput;

impl CsvOutput {
    pub fn new() -> Self {
        Self
    }

    /// File a section is written to for a given output path
    pub fn sheet_path(output_path: &Path, section: DiffSection) -> PathBuf {
        let stem = output_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("compared");
        output_path.with_file_name(format!("{}_{}.csv", stem, section))
    }

    /// Write every non-empty section, returning the files written
    pub fn write_sheets(&self, diff: &TableDiff, output_path: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (section, table) in diff.sheets() {
            let path = Self::sheet_path(output_path, section);
            write_table(table, &path)
                .with_context(|| format!("Failed to write {} rows to {}", section, path.display()))?;
            log::info!("wrote {} {} rows to {}", table.row_count(), section, path.display());
            written.push(path);
        }
        Ok(written)
    }
}

impl Default for CsvOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn write_table(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.column_names())?;
    for row in &table.rows {
        writer.write_record(row.cells.iter().map(|cell| match cell {
            CellValue::Null => String::new(),
            other => other.display().into_owned(),
        }))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff_tables;

    #[test]
    fn test_sheet_path() {
        assert_eq!(
            CsvOutput::sheet_path(Path::new("out/report.csv"), DiffSection::Changed),
            PathBuf::from("out/report_changed.csv")
        );
    }

    #[test]
    fn test_write_only_non_empty_sections() {
        let dir = tempfile::tempdir().unwrap();
        let old = Table::with_headers(&["id", "note"]).push(vec![1i64.into(), CellValue::Null]);
        let new = Table::with_headers(&["id", "note"]);
        let diff = diff_tables(&old, &new, &["id".to_string()]).unwrap();

        let written = CsvOutput::new()
            .write_sheets(&diff, &dir.path().join("diff.csv"))
            .unwrap();

        assert_eq!(written, vec![dir.path().join("diff_removed.csv")]);
        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(content, "id,note\n1,\n");
    }
}
