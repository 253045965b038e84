//! sheetdiff - Compare two spreadsheet tables row by row

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use sheetdiff::config::{Config, OutputFormat, DEFAULT_OUTPUT_PATH};
use sheetdiff::diff::diff_tables;
use sheetdiff::logging::init_logging;
use sheetdiff::output::save_diff;
use sheetdiff::parser::ParserFactory;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Xlsx,
    Json,
    Csv,
    Terminal,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Xlsx => OutputFormat::Xlsx,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Csv => OutputFormat::Csv,
            CliOutputFormat::Terminal => OutputFormat::Terminal,
        }
    }
}

/// Compares two Excel sheets (or CSV files) and outputs the differences
/// to a separate file.
#[derive(Parser, Debug)]
#[command(name = "sheetdiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// First (old) file
    path1: PathBuf,

    /// Second (new) file
    path2: PathBuf,

    /// Name of the sheet to compare (ignored for CSV files)
    sheetname: String,

    /// Name of the column(s) with unique row identifier. It has to be the
    /// actual text of the header row, not the Excel notation. Give several
    /// to create a composite key.
    #[arg(required = true, num_args = 1..)]
    key_column: Vec<String>,

    /// Path of the comparison results
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output_path: PathBuf,

    /// 0-based row to drop before the header row; repeat for several rows
    #[arg(long = "skiprows", value_name = "ROW")]
    skip_rows: Vec<usize>,

    /// Output format (json or csv for a .json or .csv output path, xlsx otherwise)
    #[arg(short, long, value_enum)]
    format: Option<CliOutputFormat>,

    /// Only show statistics, not detailed changes
    #[arg(long)]
    stats_only: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(has_changes) => {
            if has_changes {
                ExitCode::from(1) // Differences found
            } else {
                ExitCode::SUCCESS // No differences
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging();

    let output_format = cli
        .format
        .map(OutputFormat::from)
        .unwrap_or_else(|| OutputFormat::from_path(&cli.output_path));

    let config = Config::new(cli.path1, cli.path2)
        .with_sheet_name(cli.sheetname)
        .with_key_columns(cli.key_column)
        .with_output_path(cli.output_path)
        .with_output_format(output_format)
        .with_skip_rows(cli.skip_rows)
        .with_stats_only(cli.stats_only);
    log::debug!("{:?}", config);

    // Parse both files side by side
    let factory = ParserFactory::new();
    let (old_table, new_table) = rayon::join(
        || {
            factory
                .parse(&config.old_file, &config)
                .with_context(|| format!("Failed to parse old file: {}", config.old_file.display()))
        },
        || {
            factory
                .parse(&config.new_file, &config)
                .with_context(|| format!("Failed to parse new file: {}", config.new_file.display()))
        },
    );
    let old_table = old_table?;
    let new_table = new_table?;

    let diff = diff_tables(&old_table, &new_table, &config.key_columns)?;
    log::info!(
        "{} removed, {} added, {} changed, {} unchanged",
        diff.stats.rows_removed,
        diff.stats.rows_added,
        diff.stats.rows_modified,
        diff.stats.rows_unchanged
    );

    // Handle stats-only mode
    if config.stats_only {
        println!("Old file: {} ({} rows)", config.old_file.display(), diff.stats.old_row_count);
        println!("New file: {} ({} rows)", config.new_file.display(), diff.stats.new_row_count);
        println!();
        println!("Added:     {}", diff.stats.rows_added);
        println!("Removed:   {}", diff.stats.rows_removed);
        println!("Changed:   {}", diff.stats.rows_modified);
        println!("Unchanged: {}", diff.stats.rows_unchanged);
        println!("Cells changed: {}", diff.stats.cells_changed);
        return Ok(!diff.is_empty());
    }

    if diff.is_empty() {
        println!("No differences spotted");
        return Ok(false);
    }

    let written = save_diff(&diff, &config)?;
    if !written.is_empty() {
        let paths: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
        println!("Differences saved in {}", paths.join(", "));
    }

    Ok(true)
}
