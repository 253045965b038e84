//! Errors raised by the table differ

use std::fmt;

use thiserror::Error;

/// Which input table an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSide {
    Old,
    New,
}

impl fmt::Display for TableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSide::Old => write!(f, "old"),
            TableSide::New => write!(f, "new"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("no key column given")]
    EmptyKey,

    #[error("key column '{column}' is given more than once")]
    RepeatedKeyColumn { column: String },

    #[error("key column '{column}' is missing from the {side} table")]
    KeyColumnMissing { column: String, side: TableSide },

    #[error("key {key} appears more than once in the {side} table")]
    DuplicateKey { key: String, side: TableSide },
}
