//! Column metadata

use serde::Serialize;

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name (from header)
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
}

impl Column {
    /// Create a new column with name and index
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}
