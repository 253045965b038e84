//! Configuration handling for sheetdiff

use std::path::{Path, PathBuf};

/// Default location of the comparison results
pub const DEFAULT_OUTPUT_PATH: &str = "compared.xlsx";

/// Output format for diff results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One workbook with a worksheet per non-empty section
    #[default]
    Xlsx,
    /// One JSON document holding every non-empty section
    Json,
    /// One CSV file per non-empty section
    Csv,
    /// Tables printed to stdout
    Terminal,
}

impl OutputFormat {
    /// Pick a format from the output path extension, a workbook unless it
    /// names JSON or CSV
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => OutputFormat::Json,
            Some("csv") => OutputFormat::Csv,
            _ => OutputFormat::Xlsx,
        }
    }
}

/// Configuration for a comparison run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the old/original file
    pub old_file: PathBuf,
    /// Path to the new file
    pub new_file: PathBuf,
    /// Worksheet to compare (Excel inputs)
    pub sheet_name: Option<String>,
    /// Columns whose combined value identifies a row
    pub key_columns: Vec<String>,
    /// Where the comparison results are written
    pub output_path: PathBuf,
    /// Output format
    pub output_format: OutputFormat,
    /// 0-based physical rows dropped before the header row is taken
    pub skip_rows: Vec<usize>,
    /// Only show statistics, not detailed changes
    pub stats_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            old_file: PathBuf::new(),
            new_file: PathBuf::new(),
            sheet_name: None,
            key_columns: Vec::new(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            output_format: OutputFormat::default(),
            skip_rows: Vec::new(),
            stats_only: false,
        }
    }
}

impl Config {
    /// Create a new Config with file paths
    pub fn new(old_file: PathBuf, new_file: PathBuf) -> Self {
        Self {
            old_file,
            new_file,
            ..Default::default()
        }
    }

    /// Set key columns for row matching
    pub fn with_key_columns(mut self, keys: Vec<String>) -> Self {
        self.key_columns = keys;
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: String) -> Self {
        self.sheet_name = Some(name);
        self
    }

    /// Set the output path
    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = path;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set rows to drop before the header
    pub fn with_skip_rows(mut self, rows: Vec<usize>) -> Self {
        self.skip_rows = rows;
        self
    }

    /// Enable stats-only mode
    pub fn with_stats_only(mut self, stats_only: bool) -> Self {
        self.stats_only = stats_only;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out/diff.CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("compared.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("compared.xlsx")), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::from_path(Path::new("compared")), OutputFormat::Xlsx);
        assert_eq!(
            OutputFormat::from_path(Path::new(DEFAULT_OUTPUT_PATH)),
            OutputFormat::default()
        );
    }
}
