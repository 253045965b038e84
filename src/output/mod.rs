//! Output formatting for diff results

mod csv;
mod json;
mod terminal;
mod xlsx;

use std::fs::File;
use std::io::{BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{Config, OutputFormat};
use crate::diff::TableDiff;

pub use self::csv::CsvOutput;
pub use json::JsonOutput;
pub use terminal::TerminalOutput;
pub use xlsx::XlsxOutput;

/// Trait for formatters that render a whole diff into a single stream
pub trait OutputFormatter {
    /// Render diff result to a writer
    fn render(
        &self,
        diff: &TableDiff,
        old_path: &Path,
        new_path: &Path,
        writer: &mut dyn Write,
    ) -> Result<()>;
}

/// Render diff result to stdout
pub fn render_to_stdout(diff: &TableDiff, old_path: &Path, new_path: &Path, color: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    TerminalOutput::new(color).render(diff, old_path, new_path, &mut lock)
}

/// Persist a non-empty diff in the configured file format.
///
/// Returns the files written; terminal output writes none.
pub fn save_diff(diff: &TableDiff, config: &Config) -> Result<Vec<PathBuf>> {
    match config.output_format {
        OutputFormat::Xlsx => {
            XlsxOutput::new().write_workbook(diff, &config.output_path)?;
            Ok(vec![config.output_path.clone()])
        }
        OutputFormat::Json => {
            let path = &config.output_path;
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            JsonOutput::new().render(diff, &config.old_file, &config.new_file, &mut writer)?;
            writer.flush()?;
            log::info!("wrote {}", path.display());
            Ok(vec![path.clone()])
        }
        OutputFormat::Csv => CsvOutput::new().write_sheets(diff, &config.output_path),
        OutputFormat::Terminal => {
            let color = std::io::stdout().is_terminal();
            render_to_stdout(diff, &config.old_file, &config.new_file, color)?;
            Ok(Vec::new())
        }
    }
}
