//! Colored terminal output

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Ansi, Color, ColorSpec, NoColor, WriteColor};

use crate::diff::{DiffSection, TableDiff};
use crate::model::{CellValue, Table};

use super::OutputFormatter;

/// Terminal output with colored section headings
pub struct TerminalOutput {
    color: bool,
}

impl TerminalOutput {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn write_report<W: WriteColor>(
        &self,
        diff: &TableDiff,
        old_path: &Path,
        new_path: &Path,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, " sheetdiff: {} → {}", old_path.display(), new_path.display())?;
        writeln!(out)?;

        if diff.is_empty() {
            writeln!(out, "No differences spotted")?;
            return Ok(());
        }

        for change in &diff.schema_changes {
            writeln!(out, "  {}", change)?;
        }
        if !diff.schema_changes.is_empty() {
            writeln!(out)?;
        }

        writeln!(
            out,
            "Summary: +{} added, -{} removed, ~{} changed (out of {} → {} rows)",
            diff.stats.rows_added,
            diff.stats.rows_removed,
            diff.stats.rows_modified,
            diff.stats.old_row_count,
            diff.stats.new_row_count
        )?;
        writeln!(out)?;

        for (section, table) in diff.sheets() {
            out.set_color(ColorSpec::new().set_fg(Some(section_color(section))).set_bold(true))?;
            write!(out, "{} ({} rows)", section, table.row_count())?;
            out.reset()?;
            writeln!(out)?;
            writeln!(out, "{}", build_table(table))?;
        }

        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new(false)
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(
        &self,
        diff: &TableDiff,
        old_path: &Path,
        new_path: &Path,
        writer: &mut dyn Write,
    ) -> Result<()> {
        if self.color {
            self.write_report(diff, old_path, new_path, &mut Ansi::new(writer))
        } else {
            self.write_report(diff, old_path, new_path, &mut NoColor::new(writer))
        }
    }
}

fn section_color(section: DiffSection) -> Color {
    match section {
        DiffSection::Removed => Color::Red,
        DiffSection::Added => Color::Green,
        DiffSection::Changed => Color::Yellow,
    }
}

/// Render a result table with a box-drawing border
fn build_table(table: &Table) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.column_names().map(str::to_string));
    for row in &table.rows {
        builder.push_record(row.cells.iter().map(|cell| match cell {
            CellValue::Null => String::new(),
            other => other.display().into_owned(),
        }));
    }

    let mut rendered = builder.build();
    rendered.with(Style::modern());
    rendered.to_string()
}
