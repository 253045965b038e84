//! sheetdiff - Key-based diff of spreadsheet tables
//!
//! Rows of two tables are matched on one or more key columns and classified
//! as removed, added or changed. Changed cells are rendered as
//! `"old ---> new"`.

pub mod config;
pub mod diff;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod parser;

pub use config::Config;
pub use diff::{diff_tables, DiffSection, TableDiff};
pub use error::{DiffError, TableSide};
pub use model::Table;
